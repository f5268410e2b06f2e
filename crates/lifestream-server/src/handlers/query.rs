//! Query endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use lifestream_application::use_cases::{QueryRequest, QueryResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/v1/query`
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = state.search.query(request).await?;
    Ok(Json(response))
}
