//! HTTP server.
//!
//! Endpoints:
//! - `GET /export/{resource_id}` - streaming export (`offset`, `limit`, `bom`, `format`)
//! - `GET /dictionary/{package_id}/{resource_id}` - data dictionary editor
//! - `POST /dictionary/{package_id}/{resource_id}` - save the data dictionary
//! - `GET /dictionary/{resource_id}/download` - data dictionary as CSV
//! - `GET /health` - liveness check

mod error;
mod handlers;
mod types;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::storage::DataStore;
use handlers::{
    dictionary_download_handler, dictionary_handler, dictionary_save_handler, export_handler,
    health_handler,
};

pub use error::{ApiError, EXPORT_NOT_FOUND, RESOURCE_NOT_FOUND};
pub use types::AppState;

/// Builds the router over `state`.
///
/// Both dictionary routes name their first segment `{id}`; the static
/// `download` segment takes precedence over a resource id.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/export/{resource_id}", get(export_handler))
        .route(
            "/dictionary/{id}/{resource_id}",
            get(dictionary_handler).post(dictionary_save_handler),
        )
        .route("/dictionary/{id}/download", get(dictionary_download_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// On shutdown the state's token is cancelled, so running exports stop
/// before their next page fetch.
///
/// # Errors
///
/// `InitializationError::ServerBindError` when the address cannot be bound.
pub async fn start_server(
    config: &Config,
    store: Arc<dyn DataStore>,
) -> Result<(), anyhow::Error> {
    let state = AppState::new(store);
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| InitializationError::ServerBindError {
            addr: addr.clone(),
            source,
        })?;

    log::info!("Datastore server listening on http://{}/", addr);
    log::info!("  - Export: http://{}/export/<resource_id>", addr);
    log::info!("  - Dictionary: http://{}/dictionary/<package_id>/<resource_id>", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| anyhow::anyhow!("Datastore server error: {}", e))?;

    log::info!("Datastore server stopped");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        // Keep serving; only an explicit cancel stops the server now
        token.cancelled().await;
        return;
    }
    log::info!("Shutdown requested");
    token.cancel();
}
