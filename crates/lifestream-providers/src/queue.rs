//! In-memory work queue with visibility timeout and a dead-letter queue.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::Queue;
use lifestream_domain::value_objects::{QueueDelivery, WorkMessage};

struct StoredMessage {
    message: WorkMessage,
    receive_count: u32,
    /// `Some` while invisible: the active receipt and when it expires.
    lease: Option<(String, Instant)>,
}

struct QueueState {
    messages: VecDeque<StoredMessage>,
    dead_letters: Vec<WorkMessage>,
}

/// Single-process queue with at-least-once semantics.
///
/// Received messages stay in the queue but become invisible until their
/// lease expires; an expired lease makes the message receivable again with
/// an incremented receive count. Once the count exceeds
/// `max_receive_count` the message moves to the dead-letter queue.
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    max_receive_count: u32,
}

impl InMemoryQueue {
    /// Create a queue routing messages to the DLQ after
    /// `max_receive_count` deliveries.
    pub fn new(max_receive_count: u32) -> Self {
        Self {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                dead_letters: Vec::new(),
            }),
            max_receive_count: max_receive_count.max(1),
        }
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn send(&self, message: WorkMessage) -> Result<()> {
        let mut state = self.state.lock().await;
        state.messages.push_back(StoredMessage {
            message,
            receive_count: 0,
            lease: None,
        });
        Ok(())
    }

    async fn receive(
        &self,
        max_messages: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueDelivery>> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let max_receive_count = self.max_receive_count;

        // Expired leases become receivable again; exhausted messages move
        // to the DLQ before anything is handed out.
        let mut exhausted = Vec::new();
        for stored in &mut state.messages {
            if let Some((_, expiry)) = &stored.lease {
                if *expiry <= now {
                    stored.lease = None;
                }
            }
            if stored.lease.is_none() && stored.receive_count >= max_receive_count {
                exhausted.push(stored.message.clone());
            }
        }
        if !exhausted.is_empty() {
            for message in &exhausted {
                warn!(job_id = %message.job_id, "Message exhausted redeliveries; moving to DLQ");
            }
            state
                .messages
                .retain(|m| m.lease.is_some() || m.receive_count < max_receive_count);
            state.dead_letters.extend(exhausted);
        }

        let mut deliveries = Vec::new();
        for stored in &mut state.messages {
            if deliveries.len() >= max_messages {
                break;
            }
            if stored.lease.is_some() {
                continue;
            }
            let receipt = Uuid::new_v4().to_string();
            stored.receive_count += 1;
            stored.lease = Some((receipt.clone(), now + visibility));
            deliveries.push(QueueDelivery {
                message: stored.message.clone(),
                receipt,
                receive_count: stored.receive_count,
            });
        }
        Ok(deliveries)
    }

    async fn delete(&self, receipt: &str) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let position = state.messages.iter().position(|stored| {
            stored
                .lease
                .as_ref()
                .is_some_and(|(r, expiry)| r == receipt && *expiry > now)
        });
        match position {
            Some(index) => {
                let _ = state.messages.remove(index);
                Ok(())
            }
            None => Err(Error::queue(
                "receipt is unknown or expired; the message may have been redelivered",
            )),
        }
    }

    async fn dead_letters(&self) -> Result<Vec<WorkMessage>> {
        Ok(self.state.lock().await.dead_letters.clone())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
