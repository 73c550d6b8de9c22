//! # HTTP Server for Slip and Template Generation
//!
//! JSON API over both pipelines: parse slip text, generate jsPDF source,
//! render PDF previews, and drive visual builder canvases held in memory.
//!
//! ## Usage
//!
//! ```bash
//! pickslip serve --listen 0.0.0.0:8080
//! ```

mod handlers;
mod state;

pub use state::{AppState, CanvasSession, Preview, ServerConfig, DEFAULT_SESSION_TTL_SECS};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::PickslipError;

/// Build the API router over shared state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Text pipeline
        .route("/api/slip/sample", get(handlers::slip::sample))
        .route("/api/slip/parse", post(handlers::slip::parse))
        .route("/api/slip/code", post(handlers::slip::code))
        .route("/api/slip/code/download", post(handlers::slip::download))
        .route("/api/slip/preview", post(handlers::slip::preview))
        // Stateless visual pipeline
        .route("/api/visual/code", post(handlers::visual::code))
        .route("/api/visual/pdf", post(handlers::visual::pdf))
        // Rendered previews
        .route(
            "/api/previews/:id",
            get(handlers::previews::get).delete(handlers::previews::delete),
        )
        // Canvas sessions
        .route(
            "/api/canvas/element-types",
            get(handlers::canvas::element_types_list),
        )
        .route("/api/canvas", post(handlers::canvas::create))
        .route(
            "/api/canvas/:id",
            get(handlers::canvas::get).delete(handlers::canvas::delete),
        )
        .route("/api/canvas/:id/elements", post(handlers::canvas::add_element))
        .route(
            "/api/canvas/:id/elements/:eid",
            axum::routing::patch(handlers::canvas::update_element)
                .delete(handlers::canvas::remove_element),
        )
        .route("/api/canvas/:id/select", post(handlers::canvas::select))
        .route("/api/canvas/:id/pointer", post(handlers::canvas::pointer))
        .route("/api/canvas/:id/code", get(handlers::canvas::code))
        .route("/api/canvas/:id/pdf", get(handlers::canvas::pdf))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use pickslip::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), pickslip::PickslipError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     session_ttl_secs: 1800,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PickslipError> {
    let state = Arc::new(AppState::new(config.clone())?);

    tokio::spawn(cleanup_sessions(state.clone()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PickslipError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        session_ttl_secs = config.session_ttl_secs,
        "pickslip HTTP server started"
    );

    axum::serve(listener, app(state))
        .await
        .map_err(|e| PickslipError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task that expires idle canvases and previews.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
        interval.tick().await;
        let (canvases, previews) = state.expire(Instant::now()).await;
        if canvases + previews > 0 {
            tracing::info!(canvases, previews, "Expired idle sessions");
        }
    }
}
