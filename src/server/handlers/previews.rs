//! Stored PDF previews.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::PickslipError;

use super::super::state::AppState;
use super::{api_error, error_response, pdf_response, ApiError};

pub(super) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid session ID"))
}

/// GET /api/previews/:id - Stored PDF bytes.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let mut previews = state.previews.write().await;
    let preview = previews
        .get_mut(&id)
        .ok_or_else(|| error_response(PickslipError::UnknownSession(id.to_string())))?;
    preview.touch();
    Ok(pdf_response(preview.pdf.clone()))
}

/// DELETE /api/previews/:id - Release a preview.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state
        .previews
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| error_response(PickslipError::UnknownSession(id.to_string())))?;
    Ok(Json(json!({ "success": true })))
}
