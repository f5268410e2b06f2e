//! Application layer for LifeStream.
//!
//! Use cases orchestrating the domain ports:
//!
//! - [`use_cases::UploadService`] — presigned-upload handshake, idempotent
//!   confirm, status and summary reads.
//! - [`use_cases::Dispatcher`] — queue consumer converting work messages
//!   into exactly one container task per upload.
//! - [`use_cases::Orchestrator`] — the ten-stage processing pipeline run
//!   inside each task.
//! - [`use_cases::MemoryIndexer`] — chunk, embed, and upsert a daily
//!   summary into the vector store.
//! - [`use_cases::SearchService`] — semantic retrieval plus optional answer
//!   synthesis.
//!
//! Pure pipeline logic (synchronization windows, block building, chunking,
//! Markdown rendering) lives under [`pipeline`] and is exercised by the use
//! cases above.

pub mod pipeline;
pub mod settings;
pub mod use_cases;

pub use settings::{
    DispatcherSettings, IndexerSettings, PipelineSettings, SearchSettings, UploadSettings,
};
