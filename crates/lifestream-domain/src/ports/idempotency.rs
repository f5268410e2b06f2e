//! Idempotency table port.

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of a conditional claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller created the record and owns the upload
    Won,
    /// The pair was already claimed by this job id
    Existing(String),
}

/// Append-only mapping `(object_key, object_version) → job_id`.
///
/// Created by a conditional write that fails if the key already exists,
/// guaranteeing at most one job per uploaded object version over the
/// table's lifetime.
#[async_trait]
pub trait IdempotencyTable: Send + Sync {
    /// Conditionally create the record for `(object_key, object_version)`.
    ///
    /// Returns [`Claim::Won`] when this call created the record, or
    /// [`Claim::Existing`] with the previously mapped job id.
    async fn claim(&self, object_key: &str, object_version: &str, job_id: &str) -> Result<Claim>;

    /// Look up the job id mapped to `(object_key, object_version)`.
    async fn get(&self, object_key: &str, object_version: &str) -> Result<Option<String>>;

    /// Name of this provider (e.g. "memory").
    fn provider_name(&self) -> &str;
}
