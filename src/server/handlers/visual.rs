//! Stateless visual pipeline handlers: elements in, code or PDF out.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::canvas::{check_unique_ids, CanvasElement};
use crate::generate::{self, CodegenOptions};
use crate::render;

use super::super::state::AppState;
use super::{error_response, pdf_response, task_error, ApiError};

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    #[serde(default)]
    pub options: CodegenOptions,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PdfRequest {
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
}

/// POST /api/visual/code - Generate jsPDF source for an element list.
pub async fn code(Json(req): Json<CodeRequest>) -> Result<Json<CodeResponse>, ApiError> {
    check_unique_ids(&req.elements).map_err(error_response)?;
    Ok(Json(CodeResponse {
        code: generate::visual_code(&req.elements, &req.options),
    }))
}

/// POST /api/visual/pdf - Render an element list as PDF.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PdfRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_unique_ids(&req.elements).map_err(error_response)?;
    let bytes = render_pdf(&state, req.elements).await?;
    Ok(pdf_response(bytes))
}

/// Resolve image sources, then render on the blocking pool.
pub(super) async fn render_pdf(
    state: &AppState,
    elements: Vec<CanvasElement>,
) -> Result<Vec<u8>, ApiError> {
    let images = state.images.resolve_all(&elements).await;
    tokio::task::spawn_blocking(move || render::visual::render_elements(&elements, &images))
        .await
        .map_err(task_error)?
        .map_err(error_response)
}
