//! Queue message and task input formats.

use serde::{Deserialize, Serialize};

/// The JSON message enqueued for each confirmed upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkMessage {
    /// Job to process
    pub job_id: String,
    /// Blob-store key of the upload
    pub object_key: String,
    /// Content hash of the upload
    pub object_version: String,
    /// Uploader-reported duration in seconds, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_duration_hint: Option<f64>,
}

/// A received queue message with its redelivery bookkeeping.
#[derive(Debug, Clone)]
pub struct QueueDelivery {
    /// The message body
    pub message: WorkMessage,
    /// Opaque handle used to delete the message after handling
    pub receipt: String,
    /// How many times this message has been delivered (1 on first receive)
    pub receive_count: u32,
}

/// Input passed to a launched processing task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskInput {
    /// Job to process
    pub job_id: String,
    /// Blob-store key of the upload
    pub object_key: String,
    /// Content hash of the upload
    pub object_version: String,
    /// Uploader-reported duration in seconds, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_duration_hint: Option<f64>,
}

impl From<&WorkMessage> for TaskInput {
    fn from(message: &WorkMessage) -> Self {
        Self {
            job_id: message.job_id.clone(),
            object_key: message.object_key.clone(),
            object_version: message.object_version.clone(),
            client_duration_hint: message.client_duration_hint,
        }
    }
}
