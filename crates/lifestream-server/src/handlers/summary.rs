//! Summary retrieval endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use lifestream_domain::entities::{TimeBlock, VideoMetadata};

use crate::error::ApiError;
use crate::state::AppState;

/// Response of the summary endpoint.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// The rendered Markdown document
    pub summary_markdown: String,
    /// The structured time blocks
    pub time_blocks: Vec<TimeBlock>,
    /// Source video provenance
    pub video_metadata: VideoMetadata,
}

/// `GET /api/v1/summary/{job_id}`
///
/// 409 until the job completes; 404 for unknown jobs.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let artifacts = state.upload.get_summary(&job_id).await?;
    Ok(Json(SummaryResponse {
        summary_markdown: artifacts.markdown,
        time_blocks: artifacts.summary.time_blocks,
        video_metadata: artifacts.summary.video_metadata,
    }))
}
