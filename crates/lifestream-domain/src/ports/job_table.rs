//! Job table port.

use async_trait::async_trait;

use crate::entities::{Job, JobState, PipelineStage};
use crate::error::Result;

/// Fields a transition may set alongside the state change.
///
/// `None` leaves the field untouched; the table applies the mutation and
/// the `updated_at` bump atomically with the state compare-and-set.
#[derive(Debug, Clone, Default)]
pub struct JobMutation {
    /// Set the current pipeline stage
    pub stage: Option<PipelineStage>,
    /// Set the derived progress value
    pub progress: Option<f64>,
    /// Record the launched task handle
    pub task_handle: Option<String>,
    /// Record the summary artifact location
    pub result_key: Option<String>,
    /// Record the failure report location
    pub failure_report_key: Option<String>,
    /// Record the short user-visible failure description
    pub error_summary: Option<String>,
    /// Append one stage timing `(stage name, elapsed seconds)`
    pub record_timing: Option<(String, f64)>,
}

impl JobMutation {
    /// Mutation that only advances stage and progress.
    pub fn stage_advance(stage: PipelineStage, progress: f64) -> Self {
        Self {
            stage: Some(stage),
            progress: Some(progress),
            ..Self::default()
        }
    }
}

/// Persistent job rows with compare-and-set transitions.
///
/// The table is the single source of truth for job state. Rows are created
/// once, mutated through guarded transitions, and never deleted. There are
/// exactly two writers per job: the dispatcher (`queued → dispatched`,
/// `task_handle`) and the owning task (everything else).
#[async_trait]
pub trait JobTable: Send + Sync {
    /// Create a job row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Conflict`] if a row with the same id exists.
    async fn create(&self, job: Job) -> Result<()>;

    /// Fetch a job row by id.
    async fn get(&self, job_id: &str) -> Result<Option<Job>>;

    /// Atomically transition `expected → next`, applying `mutation`.
    ///
    /// Returns `Ok(false)` without writing when the row's current state is
    /// not `expected` (another writer won the race). `expected == next` is
    /// permitted only while `Processing` (stage advance).
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidTransition`] when the state machine
    /// forbids `expected → next`, and [`crate::Error::NotFound`] for an
    /// unknown job id.
    async fn transition(
        &self,
        job_id: &str,
        expected: JobState,
        next: JobState,
        mutation: JobMutation,
    ) -> Result<bool>;

    /// Apply a mutation without a state change (e.g. recording the task
    /// handle after launch).
    async fn update(&self, job_id: &str, mutation: JobMutation) -> Result<()>;

    /// Name of this provider (e.g. "memory").
    fn provider_name(&self) -> &str;
}
