//! Error handling.
//!
//! Errors are categorized by when they can occur:
//! - **Validation**: malformed request parameters, reported before any fetch (400)
//! - **Store**: missing/hidden resources (404) and rejected schema updates
//! - **Export**: mid-stream failures, after the response status is committed
//! - **Initialization**: startup failures (logger, listener, database)

mod types;

// Re-export public API
pub use types::{ExportError, InitializationError, StoreError, ValidationError};
