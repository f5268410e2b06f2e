//! Work queue port.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{QueueDelivery, WorkMessage};

/// Work queue with at-least-once delivery semantics.
///
/// Received messages become invisible for the visibility duration and are
/// redelivered if not deleted in time. After a bounded number of
/// redeliveries the queue moves the message to a dead-letter queue.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Enqueue a message.
    async fn send(&self, message: WorkMessage) -> Result<()>;

    /// Receive up to `max_messages`, making them invisible for
    /// `visibility`. Returns an empty vec when the queue is idle.
    async fn receive(
        &self,
        max_messages: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueDelivery>>;

    /// Delete a received message by its receipt handle.
    ///
    /// Deleting an expired receipt is an error: the message has already
    /// been redelivered and the handle no longer owns it.
    async fn delete(&self, receipt: &str) -> Result<()>;

    /// Messages that exhausted their redelivery budget.
    async fn dead_letters(&self) -> Result<Vec<WorkMessage>>;

    /// Name of this provider (e.g. "memory").
    fn provider_name(&self) -> &str;
}
