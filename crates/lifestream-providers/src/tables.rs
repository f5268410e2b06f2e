//! In-memory job and idempotency tables with conditional-write semantics.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use lifestream_domain::entities::{Job, JobState};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{Claim, IdempotencyTable, JobMutation, JobTable};

/// Job rows keyed by job id. Every transition runs under the row's map
/// entry, which gives the compare-and-set the same atomicity a
/// conditional-update expression has on a cloud table.
#[derive(Default)]
pub struct InMemoryJobTable {
    rows: DashMap<String, Job>,
}

impl InMemoryJobTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(job: &mut Job, mutation: JobMutation) {
        if let Some(stage) = mutation.stage {
            job.stage = Some(stage);
        }
        if let Some(progress) = mutation.progress {
            job.progress = progress;
        }
        if let Some(task_handle) = mutation.task_handle {
            job.task_handle = Some(task_handle);
        }
        if let Some(result_key) = mutation.result_key {
            job.result_key = Some(result_key);
        }
        if let Some(failure_report_key) = mutation.failure_report_key {
            job.failure_report_key = Some(failure_report_key);
        }
        if let Some(error_summary) = mutation.error_summary {
            job.error_summary = Some(error_summary);
        }
        if let Some((stage_name, seconds)) = mutation.record_timing {
            job.timings.insert(stage_name, seconds);
        }
        job.updated_at = Utc::now();
    }
}

#[async_trait]
impl JobTable for InMemoryJobTable {
    async fn create(&self, job: Job) -> Result<()> {
        match self.rows.entry(job.job_id.clone()) {
            Entry::Occupied(_) => Err(Error::conflict(format!(
                "job '{}' already exists",
                job.job_id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(job);
                Ok(())
            }
        }
    }

    async fn get(&self, job_id: &str) -> Result<Option<Job>> {
        Ok(self.rows.get(job_id).map(|row| row.value().clone()))
    }

    async fn transition(
        &self,
        job_id: &str,
        expected: JobState,
        next: JobState,
        mutation: JobMutation,
    ) -> Result<bool> {
        if !expected.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: expected.as_str().to_owned(),
                to: next.as_str().to_owned(),
            });
        }
        let Some(mut row) = self.rows.get_mut(job_id) else {
            return Err(Error::not_found(format!("job '{job_id}'")));
        };
        if row.state != expected {
            return Ok(false);
        }
        row.state = next;
        Self::apply(&mut row, mutation);
        Ok(true)
    }

    async fn update(&self, job_id: &str, mutation: JobMutation) -> Result<()> {
        let Some(mut row) = self.rows.get_mut(job_id) else {
            return Err(Error::not_found(format!("job '{job_id}'")));
        };
        Self::apply(&mut row, mutation);
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

/// Append-only `(object_key, object_version) → job_id` mapping.
#[derive(Default)]
pub struct InMemoryIdempotencyTable {
    records: DashMap<String, String>,
}

impl InMemoryIdempotencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(object_key: &str, object_version: &str) -> String {
        format!("{object_key}@{object_version}")
    }
}

#[async_trait]
impl IdempotencyTable for InMemoryIdempotencyTable {
    async fn claim(&self, object_key: &str, object_version: &str, job_id: &str) -> Result<Claim> {
        match self
            .records
            .entry(Self::composite_key(object_key, object_version))
        {
            Entry::Occupied(entry) => Ok(Claim::Existing(entry.get().clone())),
            Entry::Vacant(entry) => {
                entry.insert(job_id.to_owned());
                Ok(Claim::Won)
            }
        }
    }

    async fn get(&self, object_key: &str, object_version: &str) -> Result<Option<String>> {
        Ok(self
            .records
            .get(&Self::composite_key(object_key, object_version))
            .map(|record| record.value().clone()))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
