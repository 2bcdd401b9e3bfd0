//! Data dictionary handlers.

use axum::{
    extract::{Form, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use super::super::error::{ApiError, RESOURCE_NOT_FOUND};
use super::super::types::AppState;
use crate::dictionary::{
    dictionary_columns, dictionary_csv, editor_path, load_dictionary, render_editor,
    save_dictionary,
};
use crate::utils::attachment;

/// `GET /dictionary/{package_id}/{resource_id}`
pub async fn dictionary_handler(
    State(state): State<AppState>,
    Path((package_id, resource_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (meta, columns) = load_dictionary(state.store.as_ref(), &package_id, &resource_id)
        .await
        .map_err(|e| ApiError::from_store(e, RESOURCE_NOT_FOUND))?;
    Ok(Html(render_editor(&meta, &columns)).into_response())
}

/// `POST /dictionary/{package_id}/{resource_id}`
///
/// Saves the posted edits and redirects to the editor with `303 See Other`.
pub async fn dictionary_save_handler(
    State(state): State<AppState>,
    Path((package_id, resource_id)): Path<(String, String)>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    save_dictionary(state.store.as_ref(), &package_id, &resource_id, &form)
        .await
        .map_err(|e| ApiError::from_store(e, RESOURCE_NOT_FOUND))?;
    let location = HeaderValue::from_str(&editor_path(&package_id, &resource_id))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// `GET /dictionary/{resource_id}/download`
pub async fn dictionary_download_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> Result<Response, ApiError> {
    let columns = dictionary_columns(state.store.as_ref(), &resource_id)
        .await
        .map_err(|e| ApiError::from_store(e, RESOURCE_NOT_FOUND))?;
    let csv = dictionary_csv(&columns).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&format!("{resource_id}.csv")),
            ),
        ],
        csv,
    )
        .into_response())
}
