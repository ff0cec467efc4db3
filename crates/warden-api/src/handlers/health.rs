//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub firewall: String,
    pub sessions: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        firewall: state.firewall.name().to_string(),
        sessions: state.sessions.len(),
    })
}
