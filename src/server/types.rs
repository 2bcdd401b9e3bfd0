//! Server state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::storage::DataStore;

/// Shared state of the HTTP server
#[derive(Clone)]
pub struct AppState {
    /// Backing store, shared read-only by every request
    pub store: Arc<dyn DataStore>,
    /// Cancelled when the server shuts down; running exports stop at the next page
    pub shutdown: CancellationToken,
}

impl AppState {
    /// State with a fresh shutdown token.
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            shutdown: CancellationToken::new(),
        }
    }
}
