//! Liveness handler.

use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Whether the session token has been acquired yet.
    pub resolved: bool,
}

/// Always 200 while the process runs. `resolved` reports handle state without
/// waiting on it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        resolved: state.namespace.get_session_token().is_resolved(),
    })
}
