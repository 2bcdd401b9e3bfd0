// storage/migrations.rs
// Database migration management

use sqlx::{Pool, Sqlite};

use crate::error_handling::StoreError;

/// Runs SQLx migrations located in the `migrations/` directory.
///
/// Creates the catalog (`datastore_resources`) and dictionary
/// (`datastore_fields`) tables. Resource tables themselves are created by
/// whatever loads the data.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), StoreError> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}
