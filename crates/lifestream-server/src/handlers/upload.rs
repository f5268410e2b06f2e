//! Upload handshake endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use lifestream_application::use_cases::upload_service::PresignGrant;
use lifestream_domain::entities::JobState;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/v1/upload/presigned-url`.
#[derive(Debug, Deserialize)]
pub struct PresignRequest {
    /// Original filename of the upload
    pub filename: String,
    /// Upload size in bytes
    pub size: u64,
    /// MIME type; must be `video/*`
    pub content_type: String,
}

/// `POST /api/v1/upload/presigned-url`
pub async fn presign(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PresignRequest>,
) -> Result<Json<PresignGrant>, ApiError> {
    let grant = state
        .upload
        .presign_upload(&request.filename, request.size, &request.content_type)
        .await?;
    Ok(Json(grant))
}

/// Body of `POST /api/v1/upload/confirm`.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    /// Job id returned by the presign call
    pub job_id: String,
    /// Object key the client PUT the video to
    pub object_key: String,
    /// Duration in seconds as reported by the uploader
    #[serde(default)]
    pub client_duration_hint: Option<f64>,
}

/// Response of the confirm endpoint.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    /// The job tracking this upload
    pub job_id: String,
    /// Its current state (`queued` on first confirm)
    pub state: JobState,
}

/// `POST /api/v1/upload/confirm`
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let job = state
        .upload
        .confirm_upload(
            &request.job_id,
            &request.object_key,
            request.client_duration_hint,
        )
        .await?;
    Ok(Json(ConfirmResponse {
        job_id: job.job_id,
        state: job.state,
    }))
}
