//! Error type definitions.
//!
//! This module defines the error types used throughout the application, from
//! request validation through the backing store to the streamed export.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error binding the HTTP listener.
    #[error("Failed to bind server to {addr}: {source}")]
    ServerBindError {
        /// Address that could not be bound
        addr: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Error opening the backing store.
    #[error("Datastore initialization error: {0}")]
    StoreError(#[from] StoreError),
}

/// A malformed request parameter.
///
/// Displayed as `"<field>: <reason>"`, which is also the body of the 400
/// response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending request field
    pub field: &'static str,
    /// Human-readable reason
    pub reason: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by a [`crate::storage::DataStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The resource (or package) does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource exists but the caller may not see it.
    #[error("Not authorized to access resource: {0}")]
    NotAuthorized(String),

    /// A schema update was rejected; nothing was committed.
    #[error("Schema update rejected: {0}")]
    Persistence(String),

    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreation(String),

    /// Error applying migrations.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether the error hides the resource from the caller (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::NotAuthorized(_))
    }
}

/// Failures once an export has started streaming.
///
/// These cannot change the response status any more; the body is cut short.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A page fetch failed.
    #[error("Page fetch failed: {0}")]
    Store(#[from] StoreError),

    /// Encoding a row failed.
    #[error("Encoding failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a delimited row failed.
    #[error("Delimited encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// Encoding a JSON value failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
