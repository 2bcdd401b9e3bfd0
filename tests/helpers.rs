// Shared test helpers: in-memory stores, seeded tables and a fetch-counting wrapper.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use datastore_export::storage::{run_migrations, ColumnDefinition, Page, ResourceMeta};
use datastore_export::{router, AppState, DataStore, SqliteStore, StoreError};

/// Creates an in-memory store with migrations applied.
///
/// One connection only: every connection to `sqlite::memory:` is its own database.
#[allow(dead_code)] // Used by other test files
pub async fn memory_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    SqliteStore::new(Arc::new(pool))
}

/// Creates `people (id INT, name TEXT, _id INTEGER)` with one row `(1, 'a', 100)`
/// in package `pkg`.
#[allow(dead_code)]
pub async fn seed_people(store: &SqliteStore) {
    sqlx::query("CREATE TABLE people (id INT, name TEXT, _id INTEGER)")
        .execute(store.pool())
        .await
        .expect("Failed to create people");
    sqlx::query("INSERT INTO people (id, name, _id) VALUES (1, 'a', 100)")
        .execute(store.pool())
        .await
        .expect("Failed to insert person");
    store
        .register_resource("people", "pkg", "People", false)
        .await
        .expect("Failed to register people");
}

/// Creates `table (_id INTEGER, n INTEGER)` holding `0..rows` in package `pkg`.
#[allow(dead_code)]
pub async fn seed_numbers(store: &SqliteStore, table: &str, rows: u64) {
    sqlx::query(&format!("CREATE TABLE \"{table}\" (_id INTEGER, n INTEGER)"))
        .execute(store.pool())
        .await
        .expect("Failed to create numbers table");
    sqlx::query(&format!(
        "WITH RECURSIVE seq(x) AS (SELECT 0 UNION ALL SELECT x + 1 FROM seq WHERE x + 1 < ?)
         INSERT INTO \"{table}\" (_id, n) SELECT x + 1, x FROM seq WHERE ? > 0"
    ))
    .bind(i64::try_from(rows).expect("row count fits"))
    .bind(i64::try_from(rows).expect("row count fits"))
    .execute(store.pool())
    .await
    .expect("Failed to insert numbers");
    store
        .register_resource(table, "pkg", table, false)
        .await
        .expect("Failed to register numbers table");
}

/// Wraps a store and records every `search_page` call as `(offset, limit)`.
#[allow(dead_code)]
pub struct CountingStore<S> {
    inner: S,
    calls: Mutex<Vec<(u64, u64)>>,
    applies: Mutex<usize>,
}

#[allow(dead_code)]
impl<S: DataStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            applies: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> Vec<(u64, u64)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn applies(&self) -> usize {
        *self.applies.lock().expect("applies lock")
    }
}

#[async_trait]
impl<S: DataStore> DataStore for CountingStore<S> {
    async fn search_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, StoreError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((offset, limit));
        self.inner.search_page(resource_id, offset, limit).await
    }

    async fn apply_schema(
        &self,
        resource_id: &str,
        definitions: &[ColumnDefinition],
        force: bool,
    ) -> Result<(), StoreError> {
        *self.applies.lock().expect("applies lock") += 1;
        self.inner.apply_schema(resource_id, definitions, force).await
    }

    async fn resolve_resource(
        &self,
        package_id: &str,
        resource_id: &str,
    ) -> Result<ResourceMeta, StoreError> {
        self.inner.resolve_resource(package_id, resource_id).await
    }
}

/// Router over `store` with a fresh shutdown token.
#[allow(dead_code)]
pub fn app(store: Arc<dyn DataStore>) -> Router {
    router(AppState::new(store))
}

/// Sends one request through the router.
#[allow(dead_code)]
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

/// `GET uri`.
#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request"),
    )
    .await
}

/// Collects a response body.
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

/// Collects a response body as UTF-8.
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("body is UTF-8")
}

/// A response header as a string.
#[allow(dead_code)]
pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
