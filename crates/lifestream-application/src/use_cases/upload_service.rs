//! Upload Handshake Use Case
//!
//! # Overview
//! The `UploadService` fronts the job table and blob store for the API:
//! presigned-upload handout, idempotent upload confirmation, and the
//! status/summary read paths.
//!
//! `confirm_upload` creates the `queued` job row itself before enqueueing,
//! so a `get_status` immediately after a confirmed upload never races a
//! dispatcher-side row creation.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use lifestream_domain::entities::{DailySummary, Job, JobState};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{BlobStore, Claim, IdempotencyTable, JobTable, Queue};
use lifestream_domain::value_objects::WorkMessage;

use crate::pipeline::markdown::render_markdown;
use crate::settings::UploadSettings;

/// Response of the presign operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignGrant {
    /// Job id the client must echo back on confirm
    pub job_id: String,
    /// Signed PUT URL for the direct upload
    pub upload_url: String,
    /// Blob key the upload lands at
    pub object_key: String,
    /// When the URL expires
    pub expires_at: chrono::DateTime<Utc>,
}

/// The completed-job artifacts served by the summary endpoint.
#[derive(Debug, Clone)]
pub struct SummaryArtifacts {
    /// The canonical summary
    pub summary: DailySummary,
    /// The rendered Markdown document
    pub markdown: String,
}

/// Implementation of the API-facing upload operations.
pub struct UploadService {
    blob: Arc<dyn BlobStore>,
    jobs: Arc<dyn JobTable>,
    idempotency: Arc<dyn IdempotencyTable>,
    queue: Arc<dyn Queue>,
    settings: UploadSettings,
}

impl UploadService {
    /// Create a new upload service with injected dependencies
    pub fn new(
        blob: Arc<dyn BlobStore>,
        jobs: Arc<dyn JobTable>,
        idempotency: Arc<dyn IdempotencyTable>,
        queue: Arc<dyn Queue>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            blob,
            jobs,
            idempotency,
            queue,
            settings,
        }
    }

    /// Generate a job id and object key and hand out a presigned PUT URL.
    ///
    /// Writes nothing to the job table; the job only exists once the
    /// client confirms the upload.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an oversized upload, an
    /// empty filename, or a non-video content type.
    pub async fn presign_upload(
        &self,
        filename: &str,
        size: u64,
        content_type: &str,
    ) -> Result<PresignGrant> {
        if filename.trim().is_empty() {
            return Err(Error::invalid_argument("filename must not be empty"));
        }
        if size == 0 || size > self.settings.max_upload_bytes {
            return Err(Error::invalid_argument(format!(
                "size must be between 1 and {} bytes",
                self.settings.max_upload_bytes
            )));
        }
        if !content_type.starts_with("video/") {
            return Err(Error::invalid_argument(format!(
                "unsupported content type '{content_type}', expected video/*"
            )));
        }

        let job_id = Uuid::new_v4().to_string();
        let object_key = format!("uploads/{job_id}/{}", sanitize_filename(filename));
        let presigned = self
            .blob
            .presign_put(&object_key, content_type, self.settings.upload_url_ttl)
            .await?;

        info!(job_id = %job_id, object_key = %object_key, "Presigned upload issued");
        Ok(PresignGrant {
            job_id,
            upload_url: presigned.url,
            object_key,
            expires_at: presigned.expires_at,
        })
    }

    /// Confirm an upload: claim the idempotency record, create the queued
    /// job row, and enqueue the work message.
    ///
    /// A duplicate confirm for the same object version is idempotent and
    /// returns the originally created job.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no object exists at `object_key`.
    pub async fn confirm_upload(
        &self,
        job_id: &str,
        object_key: &str,
        client_duration_hint: Option<f64>,
    ) -> Result<Job> {
        if !self.blob.exists(object_key).await? {
            return Err(Error::not_found(format!("object '{object_key}'")));
        }
        let info = self.blob.head(object_key).await?;
        let object_version = info.content_hash;

        match self
            .idempotency
            .claim(object_key, &object_version, job_id)
            .await?
        {
            Claim::Won => {
                let job = Job::new(job_id, object_key, &object_version, client_duration_hint);
                self.jobs.create(job.clone()).await?;
                self.queue
                    .send(WorkMessage {
                        job_id: job_id.to_owned(),
                        object_key: object_key.to_owned(),
                        object_version,
                        client_duration_hint,
                    })
                    .await?;
                info!(job_id = %job_id, "Upload confirmed and queued");
                Ok(job)
            }
            Claim::Existing(existing_id) => {
                if existing_id != job_id {
                    warn!(
                        job_id = %job_id,
                        existing = %existing_id,
                        "Duplicate confirm for an already-claimed object version"
                    );
                }
                self.jobs
                    .get(&existing_id)
                    .await?
                    .ok_or_else(|| Error::internal("idempotency record points at a missing job"))
            }
        }
    }

    /// Fetch the job row for the status endpoint.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown job id.
    pub async fn get_status(&self, job_id: &str) -> Result<Job> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("job '{job_id}'")))
    }

    /// Fetch the summary artifacts of a completed job.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown job and
    /// [`Error::Conflict`] when the job has not completed.
    pub async fn get_summary(&self, job_id: &str) -> Result<SummaryArtifacts> {
        let job = self.get_status(job_id).await?;
        if job.state != JobState::Completed {
            return Err(Error::conflict(format!(
                "job '{job_id}' is {}, summary is only available once completed",
                job.state
            )));
        }
        let result_key = job
            .result_key
            .ok_or_else(|| Error::internal("completed job is missing its result key"))?;

        let bytes = self.blob.get(&result_key).await?;
        let summary: DailySummary = serde_json::from_slice(&bytes)?;

        // The rendered document is persisted next to the JSON; fall back to
        // re-rendering if it is missing.
        let markdown_key = format!("results/{job_id}/summary.md");
        let markdown = match self.blob.get(&markdown_key).await {
            Ok(bytes) => String::from_utf8(bytes)
                .unwrap_or_else(|_| render_markdown(&summary)),
            Err(_) => render_markdown(&summary),
        };

        Ok(SummaryArtifacts { summary, markdown })
    }
}

fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload.bin".to_owned()
    } else {
        cleaned
    }
}
