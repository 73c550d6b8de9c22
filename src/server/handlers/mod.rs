//! HTTP handlers for the server.
//!
//! Failures are answered as `{"success": false, "error": "..."}` with a
//! status derived from the [`PickslipError`] variant.

pub mod canvas;
pub mod previews;
pub mod slip;
pub mod visual;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::error::PickslipError;

pub type ApiError = (StatusCode, Json<Value>);

/// Error body with an explicit status.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

/// Map a library error to its HTTP status.
pub fn error_response(err: PickslipError) -> ApiError {
    let status = match &err {
        PickslipError::UnknownElement(_) | PickslipError::UnknownSession(_) => {
            StatusCode::NOT_FOUND
        }
        PickslipError::InvalidInput(_) | PickslipError::Json(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Request failed");
    }
    api_error(status, err.to_string())
}

/// Blocking-task join failure.
pub fn task_error(err: tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %err, "Render task failed");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Task error: {}", err),
    )
}

/// `application/pdf` response.
pub fn pdf_response(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/pdf")], bytes)
}
