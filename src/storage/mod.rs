// storage/mod.rs
// Backing datastore: the paged-query interface and its SQLite implementation

/// Schema migrations applied at startup.
pub mod migrations;
/// Records, columns and catalog entries exchanged with a store.
pub mod models;
/// SQLite connection pool setup.
pub mod pool;
/// [`DataStore`] backed by SQLite tables.
pub mod sqlite;

use async_trait::async_trait;
use log::debug;

use crate::config::PAGINATE_BY;
use crate::error_handling::StoreError;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use models::{Column, ColumnDefinition, Page, Record, ResourceMeta};
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteStore;

/// The backing table store, as seen by the export pipeline and the dictionary editor.
///
/// Implementations are shared across requests behind an `Arc` and must not
/// keep per-request state; pagination state lives with the caller.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns up to `limit` records starting at `offset`, plus the resource's columns.
    ///
    /// `limit = 0` returns the columns only, which doubles as an existence check.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when `resource_id` is not a table of this store,
    /// `StoreError::NotAuthorized` when it exists but is hidden from the caller.
    async fn search_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, StoreError>;

    /// Replaces the dictionary metadata of the given columns.
    ///
    /// Either every definition is applied or none is. With `force` set, stored
    /// definitions that conflict with the submitted ones are overwritten.
    ///
    /// # Errors
    ///
    /// `StoreError::Persistence` when the update is rejected.
    async fn apply_schema(
        &self,
        resource_id: &str,
        definitions: &[ColumnDefinition],
        force: bool,
    ) -> Result<(), StoreError>;

    /// Looks up the catalog entry of a resource inside a package.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` or `StoreError::NotAuthorized`.
    async fn resolve_resource(
        &self,
        package_id: &str,
        resource_id: &str,
    ) -> Result<ResourceMeta, StoreError>;
}

/// Fetches one page, capping the requested size at [`PAGINATE_BY`] rows.
///
/// # Errors
///
/// Propagates the store's error unchanged.
pub async fn fetch_page(
    store: &dyn DataStore,
    resource_id: &str,
    offset: u64,
    limit_hint: u64,
) -> Result<Page, StoreError> {
    let limit = limit_hint.min(PAGINATE_BY);
    debug!("Fetching {resource_id} offset={offset} limit={limit}");
    store.search_page(resource_id, offset, limit).await
}

/// Fetches the resource's columns without any records.
///
/// # Errors
///
/// Propagates the store's error unchanged.
pub async fn fetch_columns(
    store: &dyn DataStore,
    resource_id: &str,
) -> Result<Vec<Column>, StoreError> {
    Ok(fetch_page(store, resource_id, 0, 0).await?.columns)
}
