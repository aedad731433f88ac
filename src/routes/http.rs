// GET handlers: version, metrics

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /metrics: latest successful snapshot; 204 until the first cycle succeeds.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let latest = state.latest_rx.borrow().clone();
    match latest {
        Some(snapshot) => axum::Json(snapshot).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
