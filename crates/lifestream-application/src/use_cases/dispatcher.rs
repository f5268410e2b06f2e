//! Dispatcher Use Case
//!
//! # Overview
//! The `Dispatcher` is the long-running consumer that converts queue
//! messages into exactly one container task per uploaded object. Messages
//! are pulled in batches of one to bound blast radius; handling runs
//! concurrently up to `max_concurrent_tasks`, gated by a semaphore held
//! across the launch call.
//!
//! Exactly-once launching rests on two guards:
//! 1. the idempotency table maps each `(object_key, object_version)` to a
//!    single job id, created by conditional write, and
//! 2. the `queued → dispatched` transition is a compare-and-set, so of any
//!    number of concurrent deliveries only one wins the launch.
//!
//! A launch failure leaves the message in flight; the queue redelivers it
//! after the visibility timeout and eventually routes it to the dead-letter
//! queue. The job then stays `dispatched` until reconciled out-of-band.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use lifestream_domain::entities::{Job, JobState};
use lifestream_domain::error::Result;
use lifestream_domain::ports::{
    Claim, IdempotencyTable, JobMutation, JobTable, Queue, TaskLauncher,
};
use lifestream_domain::value_objects::{QueueDelivery, TaskInput};

use crate::settings::DispatcherSettings;

/// Queue consumer that launches one processing task per job.
#[derive(Clone)]
pub struct Dispatcher {
    queue: Arc<dyn Queue>,
    jobs: Arc<dyn JobTable>,
    idempotency: Arc<dyn IdempotencyTable>,
    launcher: Arc<dyn TaskLauncher>,
    launch_slots: Arc<Semaphore>,
    settings: DispatcherSettings,
}

impl Dispatcher {
    /// Create a new dispatcher with injected dependencies
    pub fn new(
        queue: Arc<dyn Queue>,
        jobs: Arc<dyn JobTable>,
        idempotency: Arc<dyn IdempotencyTable>,
        launcher: Arc<dyn TaskLauncher>,
        settings: DispatcherSettings,
    ) -> Self {
        let launch_slots = Arc::new(Semaphore::new(settings.max_concurrent_tasks.max(1)));
        Self {
            queue,
            jobs,
            idempotency,
            launcher,
            launch_slots,
            settings,
        }
    }

    /// Run the consume loop until the token is cancelled.
    ///
    /// In-flight handlers finish on their own; only the receive loop stops.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            max_concurrent = self.settings.max_concurrent_tasks,
            "Dispatcher started"
        );
        loop {
            let deliveries = tokio::select! {
                () = cancel.cancelled() => break,
                received = self.queue.receive(1, self.settings.queue_visibility) => {
                    match received {
                        Ok(deliveries) => deliveries,
                        Err(e) => {
                            error!(error = %e, "Queue receive failed");
                            Vec::new()
                        }
                    }
                }
            };

            if deliveries.is_empty() {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.settings.idle_backoff) => {}
                }
                continue;
            }

            for delivery in deliveries {
                // Acquiring before the spawn bounds both outstanding
                // handlers and concurrent launch RPCs.
                let permit = match Arc::clone(&self.launch_slots).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    let job_id = delivery.message.job_id.clone();
                    if let Err(e) = dispatcher.handle_delivery(delivery).await {
                        warn!(job_id = %job_id, error = %e, "Dispatch failed; message stays in flight");
                    }
                    drop(permit);
                });
            }
        }
        info!("Dispatcher stopped");
    }

    /// Handle one queue delivery end to end.
    ///
    /// An `Err` leaves the message in flight for redelivery; `Ok` means the
    /// message was deleted (either after a successful launch or because the
    /// job was already handled).
    pub async fn handle_delivery(&self, delivery: QueueDelivery) -> Result<()> {
        let message = &delivery.message;

        // 1. Resolve the job id through the idempotency table. A missing
        //    record means a bare queue delivery (e.g. direct bucket
        //    notification): create record and row atomically via the
        //    conditional claim.
        let job_id = match self
            .idempotency
            .get(&message.object_key, &message.object_version)
            .await?
        {
            Some(job_id) => job_id,
            None => {
                match self
                    .idempotency
                    .claim(&message.object_key, &message.object_version, &message.job_id)
                    .await?
                {
                    Claim::Won => {
                        let job = Job::new(
                            &message.job_id,
                            &message.object_key,
                            &message.object_version,
                            message.client_duration_hint,
                        );
                        self.jobs.create(job).await?;
                        debug!(job_id = %message.job_id, "Created job row for bare queue delivery");
                        message.job_id.clone()
                    }
                    Claim::Existing(job_id) => job_id,
                }
            }
        };

        // 2. Already handled or in flight? Delete the message and stop.
        let Some(job) = self.jobs.get(&job_id).await? else {
            // Record exists but the row does not: the creator crashed
            // between the claim and the create. Recreate and continue.
            let job = Job::new(
                &job_id,
                &message.object_key,
                &message.object_version,
                message.client_duration_hint,
            );
            self.jobs.create(job).await?;
            return self.dispatch(&job_id, &delivery).await;
        };
        if job.state != JobState::Queued {
            debug!(job_id = %job_id, state = %job.state, "Job already handled; dropping message");
            self.queue.delete(&delivery.receipt).await?;
            return Ok(());
        }

        self.dispatch(&job_id, &delivery).await
    }

    async fn dispatch(&self, job_id: &str, delivery: &QueueDelivery) -> Result<()> {
        // 3. Claim the job via CAS. Losing means another dispatcher won.
        let won = self
            .jobs
            .transition(
                job_id,
                JobState::Queued,
                JobState::Dispatched,
                JobMutation::default(),
            )
            .await?;
        if !won {
            debug!(job_id = %job_id, "Lost the dispatch race; dropping message");
            self.queue.delete(&delivery.receipt).await?;
            return Ok(());
        }

        // 4. Launch the task. On failure the message stays in flight and
        //    the job remains dispatched until reconciled.
        let input = TaskInput {
            job_id: job_id.to_owned(),
            object_key: delivery.message.object_key.clone(),
            object_version: delivery.message.object_version.clone(),
            client_duration_hint: delivery.message.client_duration_hint,
        };
        let task_handle = self.launcher.launch(input).await?;
        self.jobs
            .update(
                job_id,
                JobMutation {
                    task_handle: Some(task_handle.clone()),
                    ..JobMutation::default()
                },
            )
            .await?;

        // 5. Delete the message only after the launch call succeeded.
        self.queue.delete(&delivery.receipt).await?;
        info!(job_id = %job_id, task_handle = %task_handle, "Task launched");
        Ok(())
    }
}
