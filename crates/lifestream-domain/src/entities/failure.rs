//! The structured failure report written when a pipeline faults.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::stage::PipelineStage;
use crate::error::Error;

/// Persisted to `results/{job_id}/failure_report.json` when a job fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    /// Job the report belongs to
    pub job_id: String,
    /// Stage at which the fault occurred
    pub stage: PipelineStage,
    /// Machine-readable error class
    pub error_class: String,
    /// Human-readable error message
    pub error_message: String,
    /// Context snippet (source chain) captured at the fault site
    pub context: String,
    /// Elapsed seconds for the stages that completed before the fault
    pub partial_timings: BTreeMap<String, f64>,
    /// Blob-store keys of any partial artifacts that were written
    pub partial_artifacts: Vec<String>,
    /// When the fault was recorded
    pub failed_at: DateTime<Utc>,
}

impl FailureReport {
    /// Build a report from the failing stage and error.
    pub fn from_error(
        job_id: impl Into<String>,
        stage: PipelineStage,
        error: &Error,
        partial_timings: BTreeMap<String, f64>,
        partial_artifacts: Vec<String>,
    ) -> Self {
        let context = {
            use std::error::Error as _;
            let mut parts = vec![error.to_string()];
            let mut source = error.source();
            while let Some(cause) = source {
                parts.push(cause.to_string());
                source = cause.source();
            }
            parts.join(" <- ")
        };
        Self {
            job_id: job_id.into(),
            stage,
            error_class: error.class().to_owned(),
            error_message: error.to_string(),
            context,
            partial_timings,
            partial_artifacts,
            failed_at: Utc::now(),
        }
    }

    /// Short single-line summary surfaced on the job row.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.stage, self.error_message)
    }
}
