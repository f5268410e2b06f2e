//! Task launcher port.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::TaskInput;

/// Launches one isolated processing task per job.
#[async_trait]
pub trait TaskLauncher: Send + Sync {
    /// Launch a task and return its opaque handle.
    ///
    /// Returning `Ok` means the launch was accepted; task outcome is
    /// reported through the job table by the task itself.
    async fn launch(&self, input: TaskInput) -> Result<String>;

    /// Name of this provider (e.g. "local").
    fn provider_name(&self) -> &str;
}

/// The pipeline entry point a local task launcher drives.
///
/// Keeps the launcher implementation decoupled from the orchestrator: the
/// composition root wires the orchestrator in as the runner.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Run the full pipeline for one job. The implementation owns all job
    /// row updates, including the failure path.
    async fn run(&self, input: TaskInput) -> Result<()>;
}
