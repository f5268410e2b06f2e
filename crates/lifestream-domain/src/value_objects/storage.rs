//! Blob store value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-limited signed PUT URL for a direct client upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// The signed URL the client PUTs the object to
    pub url: String,
    /// When the URL stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Metadata for a stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobInfo {
    /// Object size in bytes
    pub size: u64,
    /// Content hash; doubles as the object version for idempotency
    pub content_hash: String,
}
