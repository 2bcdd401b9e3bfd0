//! datastore_export library: streaming exports and data dictionaries for
//! tabular datastore resources.
//!
//! Resources are tables of a SQLite database registered in a catalog. Each
//! one can be exported as CSV, TSV, JSON or XML in pages of at most
//! [`config::PAGINATE_BY`] rows, and its non-system columns carry an editable
//! data dictionary (label, description, type override).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use datastore_export::storage::SqliteStore;
//! use datastore_export::{start_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let store = SqliteStore::open(&config.db_path).await?;
//! start_server(&config, Arc::new(store)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod dictionary;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod server;
pub mod storage;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ExportError, InitializationError, StoreError, ValidationError};
pub use export::{ExportFormat, ExportRequest, ExportSummary};
pub use server::{router, start_server, AppState};
pub use storage::{DataStore, SqliteStore};
