//! Liveness check.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Always `200 ok` while the server accepts requests
pub async fn health_handler() -> Response {
    (StatusCode::OK, "ok").into_response()
}
