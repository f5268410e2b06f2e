//! Blob store port.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{BlobInfo, PresignedUpload};

/// Object storage with presigned direct uploads.
///
/// Artifact keys follow the logical layout `uploads/{object_key}` for raw
/// videos and `results/{job_id}/...` for pipeline outputs. Objects are
/// written once per key; concurrent reads are safe.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Obtain a time-limited signed PUT URL for a direct client upload.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUpload>;

    /// Store an object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Fetch an object's bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] if no object exists at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Size and content hash of the object at `key`.
    ///
    /// The content hash doubles as the object version used by the
    /// idempotency table.
    async fn head(&self, key: &str) -> Result<BlobInfo>;

    /// Delete the object at `key`. Deleting a missing object is a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this provider (e.g. "local-fs").
    fn provider_name(&self) -> &str;
}
