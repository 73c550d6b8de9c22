//! Text pipeline handlers: parse, generate code, render previews.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::generate::{self, CodegenOptions, SLIP_FUNCTION_NAME};
use crate::render;
use crate::slip::{self, SlipRecord};

use super::super::state::AppState;
use super::{api_error, task_error, ApiError};

/// Request body for parse.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

/// Request body for code generation: slip text or an already parsed record.
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub record: Option<SlipRecord>,
    #[serde(default)]
    pub options: CodegenOptions,
}

impl CodeRequest {
    /// The record to generate from; an explicit record wins over text.
    fn into_record(self) -> Result<(SlipRecord, CodegenOptions), ApiError> {
        let record = match (self.record, self.text) {
            (Some(record), _) => record,
            (None, Some(text)) => slip::parse(&text),
            (None, None) => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Request needs either text or record",
                ))
            }
        };
        Ok((record, self.options))
    }
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
    pub record: SlipRecord,
}

/// Request body for preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub text: String,
    #[serde(default)]
    pub options: CodegenOptions,
    /// Preview to release once the new one is stored.
    #[serde(default)]
    pub replaces: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub id: Uuid,
    pub url: String,
    pub code: String,
    pub record: SlipRecord,
}

/// GET /api/slip/sample - Sample slip text with today's dates.
pub async fn sample() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "text": slip::sample_text(Local::now()) }))
}

/// POST /api/slip/parse - Parse slip text into a record.
pub async fn parse(Json(req): Json<ParseRequest>) -> Json<SlipRecord> {
    Json(slip::parse(&req.text))
}

/// POST /api/slip/code - Generate jsPDF source for a slip.
pub async fn code(Json(req): Json<CodeRequest>) -> Result<Json<CodeResponse>, ApiError> {
    let (record, options) = req.into_record()?;
    let code = generate::slip_code(&record, &options);
    Ok(Json(CodeResponse { code, record }))
}

/// POST /api/slip/code/download - Generated source as a `.js` attachment.
pub async fn download(Json(req): Json<CodeRequest>) -> Result<impl IntoResponse, ApiError> {
    let (record, options) = req.into_record()?;
    let code = generate::slip_code(&record, &options);
    let filename = format!("{}.js", options.name_or(SLIP_FUNCTION_NAME));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/javascript; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        code,
    ))
}

/// POST /api/slip/preview - Render a slip PDF and store it as a preview.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let record = slip::parse(&req.text);
    let code = generate::slip_code(&record, &req.options);

    let to_render = record.clone();
    let pdf = tokio::task::spawn_blocking(move || render::slip::render_slip(&to_render))
        .await
        .map_err(task_error)?
        .map_err(|e| {
            tracing::error!(error = %e, "Slip preview failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate PDF: {}", e),
            )
        })?;

    let id = state.store_preview(pdf, req.replaces).await;
    tracing::info!(preview = %id, items = record.items.len(), "Stored slip preview");

    Ok(Json(PreviewResponse {
        id,
        url: format!("/api/previews/{}", id),
        code,
        record,
    }))
}

