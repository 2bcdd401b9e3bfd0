// storage/sqlite.rs
// SQLite-backed implementation of the datastore

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Column as _;
use sqlx::{Pool, Row, Sqlite, TypeInfo, ValueRef};

use super::models::{Column, ColumnDefinition, Page, Record, ResourceMeta};
use super::{init_db_pool_with_path, run_migrations, DataStore};
use crate::config::DB_MAX_CONNECTIONS;
use crate::error_handling::StoreError;

/// Table name prefixes that belong to SQLite, sqlx or the catalog itself.
const RESERVED_TABLE_PREFIXES: &[&str] = &["sqlite_", "_sqlx", "datastore_"];

const UPSERT_FIELD: &str = "INSERT INTO datastore_fields (resource_id, column_id, column_type, info)
     VALUES (?, ?, ?, ?)
     ON CONFLICT (resource_id, column_id)
     DO UPDATE SET column_type = excluded.column_type, info = excluded.info";

/// A datastore whose resources are tables of one SQLite database.
///
/// A table is served only once it is registered in `datastore_resources`.
/// Dictionary metadata lives in `datastore_fields`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    /// Wraps an existing pool. Migrations must already have been run.
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database file and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, the pool cannot connect,
    /// or migrations fail.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(db_path, DB_MAX_CONNECTIONS).await?;
        run_migrations(&pool).await?;
        info!("Datastore opened at {}", db_path.display());
        Ok(Self::new(pool))
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Registers an existing table as a resource of `package_id`.
    ///
    /// Private resources are hidden from every endpoint.
    ///
    /// # Errors
    ///
    /// `StoreError::Persistence` if the name is reserved for internal tables.
    pub async fn register_resource(
        &self,
        resource_id: &str,
        package_id: &str,
        name: &str,
        private: bool,
    ) -> Result<(), StoreError> {
        if is_reserved_table(resource_id) {
            return Err(StoreError::Persistence(format!(
                "'{resource_id}' is a reserved table name"
            )));
        }
        sqlx::query(
            "INSERT INTO datastore_resources (resource_id, package_id, name, private)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (resource_id)
             DO UPDATE SET package_id = excluded.package_id, name = excluded.name,
                           private = excluded.private",
        )
        .bind(resource_id)
        .bind(package_id)
        .bind(name)
        .bind(private)
        .execute(self.pool.as_ref())
        .await?;
        debug!("Registered resource {resource_id} in package {package_id}");
        Ok(())
    }

    async fn catalog_entry(
        &self,
        resource_id: &str,
    ) -> Result<Option<(ResourceMeta, bool)>, StoreError> {
        let row = sqlx::query(
            "SELECT resource_id, package_id, name, private
             FROM datastore_resources WHERE resource_id = ?",
        )
        .bind(resource_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let meta = ResourceMeta {
            resource_id: row.try_get("resource_id")?,
            package_id: row.try_get("package_id")?,
            name: row.try_get("name")?,
        };
        let private: bool = row.try_get("private")?;
        Ok(Some((meta, private)))
    }

    /// Catalog entry of a resource the caller may see.
    async fn visible_resource(&self, resource_id: &str) -> Result<ResourceMeta, StoreError> {
        match self.catalog_entry(resource_id).await? {
            None => Err(StoreError::NotFound(resource_id.to_string())),
            Some((_, true)) => Err(StoreError::NotAuthorized(resource_id.to_string())),
            Some((meta, false)) => Ok(meta),
        }
    }

    /// `(name, type)` pairs of the resource table in declared order.
    ///
    /// Empty when the table does not exist.
    async fn table_columns(&self, resource_id: &str) -> Result<Vec<(String, String)>, StoreError> {
        let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?) ORDER BY cid")
            .bind(resource_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let declared: String = row.try_get("type")?;
                Ok((name, normalize_type(&declared)))
            })
            .collect()
    }

    async fn stored_info(&self, resource_id: &str) -> Result<HashMap<String, Map<String, Value>>, StoreError> {
        let rows = sqlx::query("SELECT column_id, info FROM datastore_fields WHERE resource_id = ?")
            .bind(resource_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        let mut info = HashMap::with_capacity(rows.len());
        for row in rows {
            let column_id: String = row.try_get("column_id")?;
            let text: String = row.try_get("info")?;
            match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(map) => {
                    info.insert(column_id, map);
                }
                Err(e) => warn!("Ignoring malformed dictionary entry for {resource_id}.{column_id}: {e}"),
            }
        }
        Ok(info)
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn search_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, StoreError> {
        self.visible_resource(resource_id).await?;

        let table_columns = self.table_columns(resource_id).await?;
        if table_columns.is_empty() {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }

        let mut info = self.stored_info(resource_id).await?;
        let columns = table_columns
            .into_iter()
            .map(|(id, column_type)| {
                let info = info.remove(&id);
                Column {
                    id,
                    column_type,
                    info,
                }
            })
            .collect();

        let records = if limit == 0 {
            Vec::new()
        } else {
            let sql = format!(
                "SELECT * FROM {} ORDER BY rowid LIMIT ? OFFSET ?",
                quote_identifier(resource_id)
            );
            let rows = sqlx::query(&sql)
                .bind(i64::try_from(limit).unwrap_or(i64::MAX))
                .bind(i64::try_from(offset).unwrap_or(i64::MAX))
                .fetch_all(self.pool.as_ref())
                .await?;
            rows.iter()
                .map(decode_record)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Page { columns, records })
    }

    async fn apply_schema(
        &self,
        resource_id: &str,
        definitions: &[ColumnDefinition],
        force: bool,
    ) -> Result<(), StoreError> {
        self.visible_resource(resource_id).await?;

        let existing: HashSet<String> = self
            .table_columns(resource_id)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        if existing.is_empty() {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }
        if let Some(unknown) = definitions.iter().find(|d| !existing.contains(&d.id)) {
            return Err(StoreError::Persistence(format!(
                "column '{}' does not exist in {resource_id}",
                unknown.id
            )));
        }

        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;
        for definition in definitions {
            if !force {
                let stored: Option<String> = sqlx::query_scalar(
                    "SELECT column_type FROM datastore_fields
                     WHERE resource_id = ? AND column_id = ?",
                )
                .bind(resource_id)
                .bind(&definition.id)
                .fetch_optional(&mut *tx)
                .await?;
                if let Some(stored) = stored.filter(|s| *s != definition.column_type) {
                    return Err(StoreError::Persistence(format!(
                        "conflicting type for column '{}': stored {stored}, submitted {}",
                        definition.id, definition.column_type
                    )));
                }
            }

            let info = serde_json::to_string(&definition.info)
                .map_err(|e| StoreError::Persistence(e.to_string()))?;
            sqlx::query(UPSERT_FIELD)
                .bind(resource_id)
                .bind(&definition.id)
                .bind(&definition.column_type)
                .bind(info)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(
            "Applied {} column definitions to {resource_id} (force={force})",
            definitions.len()
        );
        Ok(())
    }

    async fn resolve_resource(
        &self,
        package_id: &str,
        resource_id: &str,
    ) -> Result<ResourceMeta, StoreError> {
        match self.catalog_entry(resource_id).await? {
            Some((meta, _)) if meta.package_id != package_id => {
                Err(StoreError::NotFound(format!("{package_id}/{resource_id}")))
            }
            None => Err(StoreError::NotFound(format!("{package_id}/{resource_id}"))),
            Some((_, true)) => Err(StoreError::NotAuthorized(resource_id.to_string())),
            Some((meta, false)) => Ok(meta),
        }
    }
}

fn is_reserved_table(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    name.is_empty()
        || RESERVED_TABLE_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Lower-cased declared type; untyped columns are reported as `text`.
fn normalize_type(declared: &str) -> String {
    let trimmed = declared.trim();
    if trimmed.is_empty() {
        "text".to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn decode_record(row: &SqliteRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), decode_value(row, idx)?);
    }
    Ok(record)
}

/// Maps a value by its storage class, not the column's declared type.
fn decode_value(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(idx)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(idx)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqliteStore::new(Arc::new(pool))
    }

    async fn seed_people(store: &SqliteStore) {
        sqlx::query("CREATE TABLE people (id INT, name TEXT, score REAL, _id INTEGER)")
            .execute(store.pool())
            .await
            .expect("create table");
        for (id, name, score) in [(1, "ada", 9.5), (2, "grace", 8.0), (3, "linus", 7.25)] {
            sqlx::query("INSERT INTO people (id, name, score, _id) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(score)
                .bind(id * 100)
                .execute(store.pool())
                .await
                .expect("insert row");
        }
        store
            .register_resource("people", "pkg", "People", false)
            .await
            .expect("register");
    }

    #[tokio::test]
    async fn test_search_page_returns_columns_in_table_order() {
        let store = memory_store().await;
        seed_people(&store).await;

        let page = store.search_page("people", 0, 0).await.expect("page");
        let ids: Vec<&str> = page.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["id", "name", "score", "_id"]);
        assert_eq!(page.columns[0].column_type, "int");
        assert_eq!(page.columns[3].column_type, "integer");
        assert_eq!(page.row_count(), 0);
    }

    #[tokio::test]
    async fn test_search_page_offset_and_limit() {
        let store = memory_store().await;
        seed_people(&store).await;

        let page = store.search_page("people", 1, 5).await.expect("page");
        assert_eq!(page.row_count(), 2);
        assert_eq!(page.records[0]["name"], json!("grace"));
        assert_eq!(page.records[0]["score"], json!(8.0));
        assert_eq!(page.records[1]["_id"], json!(300));
    }

    #[tokio::test]
    async fn test_search_page_null_values() {
        let store = memory_store().await;
        seed_people(&store).await;
        sqlx::query("INSERT INTO people (id, name) VALUES (4, NULL)")
            .execute(store.pool())
            .await
            .expect("insert");

        let page = store.search_page("people", 3, 1).await.expect("page");
        assert_eq!(page.records[0]["name"], Value::Null);
        assert_eq!(page.records[0]["score"], Value::Null);
    }

    #[tokio::test]
    async fn test_unregistered_table_is_not_found() {
        let store = memory_store().await;
        sqlx::query("CREATE TABLE hidden (id INT)")
            .execute(store.pool())
            .await
            .expect("create");

        let result = store.search_page("hidden", 0, 0).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        let result = store.search_page("nope", 0, 10).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_registered_but_missing_table_is_not_found() {
        let store = memory_store().await;
        store
            .register_resource("ghost", "pkg", "Ghost", false)
            .await
            .expect("register");
        let result = store.search_page("ghost", 0, 0).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_private_resource_is_not_authorized() {
        let store = memory_store().await;
        seed_people(&store).await;
        store
            .register_resource("people", "pkg", "People", true)
            .await
            .expect("register private");

        let result = store.search_page("people", 0, 0).await;
        assert!(matches!(result, Err(StoreError::NotAuthorized(_))));
        let result = store.resolve_resource("pkg", "people").await;
        assert!(matches!(result, Err(StoreError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_reserved_names_cannot_be_registered() {
        let store = memory_store().await;
        for name in ["datastore_fields", "sqlite_master", "_sqlx_migrations", ""] {
            let result = store.register_resource(name, "pkg", "x", false).await;
            assert!(
                matches!(result, Err(StoreError::Persistence(_))),
                "{name} should be reserved"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_resource_checks_package() {
        let store = memory_store().await;
        seed_people(&store).await;

        let meta = store.resolve_resource("pkg", "people").await.expect("meta");
        assert_eq!(meta.name, "People");
        let result = store.resolve_resource("other", "people").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_schema_stores_info() {
        let store = memory_store().await;
        seed_people(&store).await;

        let definitions = vec![ColumnDefinition {
            id: "name".to_string(),
            column_type: "text".to_string(),
            info: json!({"label": "Name", "notes": "Given name"})
                .as_object()
                .cloned()
                .expect("object"),
        }];
        store
            .apply_schema("people", &definitions, true)
            .await
            .expect("apply");

        let page = store.search_page("people", 0, 0).await.expect("page");
        let name = &page.columns[1];
        assert_eq!(name.info_text("label"), "Name");
        assert_eq!(name.info_text("notes"), "Given name");
        assert!(page.columns[0].info.is_none());
    }

    #[tokio::test]
    async fn test_apply_schema_unknown_column_commits_nothing() {
        let store = memory_store().await;
        seed_people(&store).await;

        let definitions = vec![
            ColumnDefinition {
                id: "name".to_string(),
                column_type: "text".to_string(),
                info: Map::new(),
            },
            ColumnDefinition {
                id: "missing".to_string(),
                column_type: "text".to_string(),
                info: Map::new(),
            },
        ];
        let result = store.apply_schema("people", &definitions, true).await;
        assert!(matches!(result, Err(StoreError::Persistence(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datastore_fields")
            .fetch_one(store.pool())
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_apply_schema_type_conflict_requires_force() {
        let store = memory_store().await;
        seed_people(&store).await;

        let as_text = vec![ColumnDefinition {
            id: "id".to_string(),
            column_type: "text".to_string(),
            info: Map::new(),
        }];
        let as_int = vec![ColumnDefinition {
            id: "id".to_string(),
            column_type: "int".to_string(),
            info: Map::new(),
        }];
        store.apply_schema("people", &as_text, false).await.expect("first");

        let result = store.apply_schema("people", &as_int, false).await;
        assert!(matches!(result, Err(StoreError::Persistence(_))));

        store.apply_schema("people", &as_int, true).await.expect("forced");
        let stored: String = sqlx::query_scalar(
            "SELECT column_type FROM datastore_fields WHERE column_id = 'id'",
        )
        .fetch_one(store.pool())
        .await
        .expect("stored type");
        assert_eq!(stored, "int");
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("plain"), "\"plain\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("INT"), "int");
        assert_eq!(normalize_type(" Text "), "text");
        assert_eq!(normalize_type(""), "text");
    }
}
