//! Data dictionary: per-column label, description and type override.
//!
//! The dictionary covers the non-system columns of a resource in table
//! order. Saving replaces the `info` of every such column at once.

mod download;
mod form;
mod merge;
mod render;

use log::info;

use crate::error_handling::StoreError;
use crate::storage::{fetch_columns, Column, ColumnDefinition, DataStore, ResourceMeta};

pub use download::dictionary_csv;
pub use form::parse_info_form;
pub use merge::{editable_columns, merge_dictionary};
pub use render::{download_path, editor_path, render_editor};

/// Resolves a resource inside its package and returns its editable columns.
///
/// # Errors
///
/// `NotFound`/`NotAuthorized` when the package, resource or table is missing
/// or hidden.
pub async fn load_dictionary(
    store: &dyn DataStore,
    package_id: &str,
    resource_id: &str,
) -> Result<(ResourceMeta, Vec<Column>), StoreError> {
    let meta = store.resolve_resource(package_id, resource_id).await?;
    let columns = fetch_columns(store, resource_id).await?;
    Ok((meta, editable_columns(columns)))
}

/// Editable columns of a resource, without any package check.
///
/// # Errors
///
/// `NotFound`/`NotAuthorized` as for [`load_dictionary`].
pub async fn dictionary_columns(
    store: &dyn DataStore,
    resource_id: &str,
) -> Result<Vec<Column>, StoreError> {
    Ok(editable_columns(fetch_columns(store, resource_id).await?))
}

/// Merges the posted form onto the current columns and applies it with `force`.
///
/// Returns the definitions that were applied.
///
/// # Errors
///
/// Lookup errors as for [`load_dictionary`]; `Persistence` when the store
/// rejects the update, in which case nothing was saved.
pub async fn save_dictionary(
    store: &dyn DataStore,
    package_id: &str,
    resource_id: &str,
    form: &[(String, String)],
) -> Result<Vec<ColumnDefinition>, StoreError> {
    let (_, columns) = load_dictionary(store, package_id, resource_id).await?;
    let edits = parse_info_form(form, columns.len());
    let merged = merge_dictionary(&columns, &edits);
    store.apply_schema(resource_id, &merged, true).await?;
    info!(
        "Data dictionary saved for {package_id}/{resource_id} ({} columns)",
        merged.len()
    );
    Ok(merged)
}
