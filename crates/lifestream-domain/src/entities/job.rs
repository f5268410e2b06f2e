//! The job entity and its lifecycle state machine.
//!
//! A job tracks one uploaded video from confirmation through indexed
//! completion. Transitions are monotonic:
//! `queued → dispatched → processing → (completed | failed)`, and terminal
//! states admit no further transitions. Every writer gates its transition on
//! a compare-and-set against the prior state, so no process-wide locks are
//! needed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::stage::PipelineStage;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Confirmed upload waiting for the dispatcher
    Queued,
    /// Claimed by a dispatcher; a task launch is in flight or done
    Dispatched,
    /// The owning task is executing the pipeline
    Processing,
    /// Pipeline finished; `result_key` points at the summary artifact
    Completed,
    /// Pipeline faulted; `failure_report_key` points at the report
    Failed,
}

impl JobState {
    /// Returns `true` if the job is in a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the state machine permits `self → next`.
    ///
    /// Self-transitions are allowed while `Processing` (stage advances
    /// mutate the row without changing state); any non-terminal state may
    /// move to `Failed`.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Queued, Self::Dispatched)
            | (Self::Dispatched, Self::Processing)
            | (Self::Processing, Self::Processing)
            | (Self::Processing, Self::Completed) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Wire name of the state (`snake_case`, matches the serde rename)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Dispatched => "dispatched",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of work for one uploaded video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque client-visible identifier
    pub job_id: String,
    /// Blob-store key of the uploaded object
    pub object_key: String,
    /// Content hash of the uploaded object; with `object_key` forms the
    /// idempotency key
    pub object_version: String,
    /// Duration in seconds reported by the uploader, used only for
    /// divergence logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_duration_hint: Option<f64>,
    /// Current lifecycle state
    pub state: JobState,
    /// Current pipeline stage while `Processing`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    /// Monotonic progress in `[0, 1]`, derived from completed stages
    pub progress: f64,
    /// Elapsed seconds per completed stage
    pub timings: BTreeMap<String, f64>,
    /// Opaque identifier of the running container task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_handle: Option<String>,
    /// Blob-store location of the final summary JSON (set at completion)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,
    /// Blob-store location of the failure report (set at failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_report_key: Option<String>,
    /// Short user-visible failure description (set at failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
    /// When the job row was created
    pub created_at: DateTime<Utc>,
    /// When the job row was last written
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job in `Queued` state
    pub fn new(
        job_id: impl Into<String>,
        object_key: impl Into<String>,
        object_version: impl Into<String>,
        client_duration_hint: Option<f64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            object_key: object_key.into(),
            object_version: object_version.into(),
            client_duration_hint,
            state: JobState::Queued,
            stage: None,
            progress: 0.0,
            timings: BTreeMap::new(),
            task_handle: None,
            result_key: None,
            failure_report_key: None,
            error_summary: None,
            created_at: now,
            updated_at: now,
        }
    }
}
