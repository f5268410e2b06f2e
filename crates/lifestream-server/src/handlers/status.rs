//! Job status endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use lifestream_domain::entities::Job;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/status/{job_id}`
///
/// Returns the job row as-is; there are no secrets on it.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let job = state.upload.get_status(&job_id).await?;
    Ok(Json(job))
}
