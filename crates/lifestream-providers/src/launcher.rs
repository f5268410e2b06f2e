//! Local task launcher: one spawned task per job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use lifestream_domain::error::Result;
use lifestream_domain::ports::{PipelineRunner, TaskLauncher};
use lifestream_domain::value_objects::TaskInput;

/// Runs each job's pipeline as a spawned local task.
///
/// Stands in for a container runtime: the "container" is a tokio task and
/// the handle is a generated id. The runner owns all job row updates, so a
/// task error here is only logged (the cloud equivalent of a non-zero task
/// exit). A task killed by the hard wall-clock timeout makes no further
/// state updates; its job row stays `processing` until reconciled
/// out-of-band.
pub struct LocalTaskLauncher {
    runner: Arc<dyn PipelineRunner>,
    hard_timeout: Duration,
}

impl LocalTaskLauncher {
    /// Create a launcher driving the given pipeline runner.
    pub fn new(runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            runner,
            hard_timeout: Duration::from_secs(2 * 60 * 60),
        }
    }

    /// Override the hard wall-clock timeout; must exceed the pipeline's
    /// worst case.
    #[must_use]
    pub fn with_hard_timeout(mut self, hard_timeout: Duration) -> Self {
        self.hard_timeout = hard_timeout;
        self
    }
}

#[async_trait]
impl TaskLauncher for LocalTaskLauncher {
    async fn launch(&self, input: TaskInput) -> Result<String> {
        let task_handle = format!("task-{}", Uuid::new_v4());
        let runner = Arc::clone(&self.runner);
        let handle_for_log = task_handle.clone();
        let hard_timeout = self.hard_timeout;
        tokio::spawn(async move {
            let job_id = input.job_id.clone();
            match tokio::time::timeout(hard_timeout, runner.run(input)).await {
                Ok(Ok(())) => {
                    info!(job_id = %job_id, task_handle = %handle_for_log, "Task finished");
                }
                Ok(Err(e)) => {
                    error!(
                        job_id = %job_id,
                        task_handle = %handle_for_log,
                        error = %e,
                        "Task exited with failure"
                    );
                }
                Err(_) => {
                    error!(
                        job_id = %job_id,
                        task_handle = %handle_for_log,
                        timeout_seconds = hard_timeout.as_secs(),
                        "Task killed by the hard wall-clock timeout; job row needs reconciling"
                    );
                }
            }
        });
        Ok(task_handle)
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}
