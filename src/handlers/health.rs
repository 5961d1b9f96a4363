use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let pdf_service = state.processor.is_available();

    let status = if pdf_service { "healthy" } else { "degraded" };

    info!(status = status, pdf_available = pdf_service, "Health check completed");

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "pdf_processor": pdf_service,
            "backend": state.processor.backend()
        }
    }))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.processor.is_available() {
        StatusCode::OK
    } else {
        info!("Readiness check failed - PDF service unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
