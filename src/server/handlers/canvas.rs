//! Visual builder canvas sessions.
//!
//! Each session owns one [`Canvas`]; every mutating call answers with the
//! full canvas and its regenerated code so the client never diverges.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::canvas::{
    element_types, Canvas, CanvasElement, ElementId, ElementPatch, ElementTypeMeta, PointerEvent,
    PointerOutcome,
};
use crate::error::PickslipError;
use crate::generate::CodegenOptions;

use super::super::state::{AppState, CanvasSession};
use super::previews::parse_id;
use super::visual::render_pdf;
use super::{api_error, error_response, pdf_response, ApiError};

/// Session id, canvas state and current code.
#[derive(Debug, Serialize)]
pub struct CanvasView {
    pub id: Uuid,
    pub canvas: Canvas,
    pub code: String,
}

impl CanvasView {
    fn of(id: Uuid, canvas: &Canvas) -> Self {
        Self {
            id,
            canvas: canvas.clone(),
            code: canvas.code().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub options: CodegenOptions,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub element: Option<ElementId>,
}

#[derive(Debug, Serialize)]
pub struct ElementResponse {
    pub element: CanvasElement,
    #[serde(flatten)]
    pub view: CanvasView,
}

#[derive(Debug, Serialize)]
pub struct PointerResponse {
    pub outcome: PointerOutcome,
    #[serde(flatten)]
    pub view: CanvasView,
}

fn parse_element_id(eid: &str) -> Result<ElementId, ApiError> {
    eid.parse::<u64>()
        .map(ElementId)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid element ID"))
}

/// Run `f` against a session's canvas and snapshot the result.
async fn with_canvas<R>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut Canvas) -> Result<R, PickslipError>,
) -> Result<(R, CanvasView), ApiError> {
    let id = parse_id(id)?;
    let mut sessions = state.canvases.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| error_response(PickslipError::UnknownSession(id.to_string())))?;
    session.touch();
    let out = f(&mut session.canvas).map_err(error_response)?;
    Ok((out, CanvasView::of(id, &session.canvas)))
}

/// GET /api/canvas/element-types - Addable element types.
pub async fn element_types_list() -> Json<Vec<ElementTypeMeta>> {
    Json(element_types())
}

/// POST /api/canvas - Start a new canvas session.
pub async fn create(
    State(state): State<Arc<AppState>>,
    req: Option<Json<CreateRequest>>,
) -> Json<CanvasView> {
    let options = req.map(|Json(r)| r.options).unwrap_or_default();
    let mut canvas = Canvas::new();
    canvas.set_options(options);

    let id = Uuid::new_v4();
    let view = CanvasView::of(id, &canvas);
    state
        .canvases
        .write()
        .await
        .insert(id, CanvasSession::new(canvas));
    tracing::info!(canvas = %id, "Created canvas session");
    Json(view)
}

/// GET /api/canvas/:id - Current canvas state.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CanvasView>, ApiError> {
    let ((), view) = with_canvas(&state, &id, |_| Ok(())).await?;
    Ok(Json(view))
}

/// DELETE /api/canvas/:id - End a session.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state
        .canvases
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| error_response(PickslipError::UnknownSession(id.to_string())))?;
    tracing::info!(canvas = %id, "Deleted canvas session");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/canvas/:id/elements - Add an element with editor defaults.
pub async fn add_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddRequest>,
) -> Result<Json<ElementResponse>, ApiError> {
    let (element, view) = with_canvas(&state, &id, |canvas| {
        let eid = canvas.add(&req.type_name)?;
        canvas
            .element(eid)
            .cloned()
            .ok_or(PickslipError::UnknownElement(eid))
    })
    .await?;
    tracing::debug!(canvas = %view.id, element = %element.id, kind = element.type_name(), "Added element");
    Ok(Json(ElementResponse { element, view }))
}

/// PATCH /api/canvas/:id/elements/:eid - Partially update an element.
pub async fn update_element(
    State(state): State<Arc<AppState>>,
    Path((id, eid)): Path<(String, String)>,
    Json(patch): Json<ElementPatch>,
) -> Result<Json<ElementResponse>, ApiError> {
    let eid = parse_element_id(&eid)?;
    let (element, view) =
        with_canvas(&state, &id, |canvas| canvas.update(eid, &patch).cloned()).await?;
    Ok(Json(ElementResponse { element, view }))
}

/// DELETE /api/canvas/:id/elements/:eid - Remove an element.
pub async fn remove_element(
    State(state): State<Arc<AppState>>,
    Path((id, eid)): Path<(String, String)>,
) -> Result<Json<ElementResponse>, ApiError> {
    let eid = parse_element_id(&eid)?;
    let (element, view) = with_canvas(&state, &id, |canvas| canvas.remove(eid)).await?;
    Ok(Json(ElementResponse { element, view }))
}

/// POST /api/canvas/:id/select - Select an element, or clear with `null`.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<CanvasView>, ApiError> {
    let ((), view) = with_canvas(&state, &id, |canvas| canvas.select(req.element)).await?;
    Ok(Json(view))
}

/// POST /api/canvas/:id/pointer - Feed a pointer event to the drag machine.
pub async fn pointer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<PointerResponse>, ApiError> {
    let (outcome, view) = with_canvas(&state, &id, |canvas| Ok(canvas.pointer(event))).await?;
    Ok(Json(PointerResponse { outcome, view }))
}

/// GET /api/canvas/:id/code - Current generated source.
pub async fn code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let ((), view) = with_canvas(&state, &id, |_| Ok(())).await?;
    Ok(Json(json!({ "code": view.code })))
}

/// GET /api/canvas/:id/pdf - Render the canvas as PDF.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (elements, _) =
        with_canvas(&state, &id, |canvas| Ok(canvas.elements().to_vec())).await?;
    let bytes = render_pdf(&state, elements).await?;
    Ok(pdf_response(bytes))
}
