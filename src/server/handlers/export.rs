//! Streaming export handler.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::super::error::ApiError;
use super::super::types::AppState;
use crate::config::EXPORT_CHANNEL_CAPACITY;
use crate::export::{ChannelSink, ExportRequest, PreparedExport};

/// `GET /export/{resource_id}`
///
/// Validation and the first page fetch happen before the response exists, so
/// 400 and 404 are always clean. The rest of the export runs in its own task
/// and streams through a bounded channel.
pub async fn export_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let request = ExportRequest::from_params(resource_id, &params)?;
    let prepared = PreparedExport::start(state.store.as_ref(), request)
        .await
        .map_err(ApiError::from_export)?;

    let content_type = prepared.content_type();
    let disposition = prepared.content_disposition();

    let (tx, rx) = mpsc::channel(EXPORT_CHANNEL_CAPACITY);
    let store = state.store.clone();
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        let mut sink = ChannelSink::new(tx);
        // Failures are logged by the pipeline and surface as a cut body
        let _ = prepared.stream(store.as_ref(), &mut sink, &shutdown).await;
    });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response())
}
