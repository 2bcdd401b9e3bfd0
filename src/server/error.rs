//! Mapping of request failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error_handling::{ExportError, StoreError, ValidationError};

/// Body of every 404 raised by the export endpoint.
pub const EXPORT_NOT_FOUND: &str = "DataStore resource not found";
/// Body of every 404 raised by the dictionary endpoints.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";

/// A request failure, decided before any body byte is sent.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed parameter (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or hidden resource (404); the message is fixed per endpoint
    #[error("{0}")]
    NotFound(&'static str),

    /// Anything else (500); details are logged, not returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a store failure, using `not_found` as the 404 body.
    pub fn from_store(error: StoreError, not_found: &'static str) -> Self {
        if error.is_not_found() {
            log::debug!("{error}");
            ApiError::NotFound(not_found)
        } else {
            ApiError::Internal(error.to_string())
        }
    }

    /// Maps a failure to start an export.
    pub fn from_export(error: ExportError) -> Self {
        match error {
            ExportError::Store(e) => Self::from_store(e, EXPORT_NOT_FOUND),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiError::Internal(cause) => {
                log::error!("Request failed: {cause}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
