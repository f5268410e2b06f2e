//! Provider implementations for LifeStream.
//!
//! One concrete implementation per domain port:
//!
//! - [`blob::LocalBlobStore`] — filesystem-backed object store with
//!   presigned-PUT simulation.
//! - [`queue::InMemoryQueue`] — visibility-timeout queue with redelivery
//!   counting and a dead-letter queue.
//! - [`tables::InMemoryJobTable`] / [`tables::InMemoryIdempotencyTable`] —
//!   CAS-guarded key-value tables.
//! - [`vector::InMemoryVectorStore`] — cosine-similarity index with
//!   metadata filtering.
//! - [`launcher::LocalTaskLauncher`] — spawns the pipeline runner as a
//!   local task, one per job.
//! - [`models`] — deterministic mock backends for every model port plus
//!   OpenAI-style HTTP embedding/LLM backends.
//! - [`secrets::EnvSecrets`] — environment-backed secrets provider.

pub mod blob;
pub mod launcher;
pub mod models;
pub mod queue;
pub mod secrets;
pub mod tables;
pub mod vector;
