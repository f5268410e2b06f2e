//! Health endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health report: liveness plus the wired provider names.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the process serves requests
    pub status: &'static str,
    /// Provider name per concern
    pub providers: HashMap<String, String>,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        providers: state.provider_names.clone(),
    })
}
