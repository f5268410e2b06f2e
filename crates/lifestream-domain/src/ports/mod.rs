//! Port traits the service core depends on.
//!
//! Six narrow infrastructure ports abstract the cloud primitives the
//! original system coupled to, so any equivalent managed offering can be
//! substituted:
//!
//! | Port | Description |
//! | ------ | ------------- |
//! | `BlobStore` | Object storage with presigned PUT uploads |
//! | `Queue` | Work queue with visibility timeout and a dead-letter queue |
//! | `JobTable` | Job rows with compare-and-set state transitions |
//! | `IdempotencyTable` | Conditional-create `(object_key, version) → job_id` mapping |
//! | `TaskLauncher` | One isolated processing task per job |
//! | `VectorStore` | Upsert + filtered similarity search over chunk vectors |
//!
//! ML components are strategy ports with one uniform call shape each, so
//! the orchestrator can swap mocks for tests and real backends in
//! production without conditional code paths.

pub mod blob_store;
pub mod idempotency;
pub mod job_table;
pub mod models;
pub mod queue;
pub mod secrets;
pub mod task_launcher;
pub mod vector_store;

pub use blob_store::BlobStore;
pub use idempotency::{Claim, IdempotencyTable};
pub use job_table::{JobMutation, JobTable};
pub use models::{
    AnswerSynthesizer, AsrEngine, BlockSummary, Diarizer, EmbeddingProvider, KeyframeExtractor,
    MediaProbe, MeetingClassifier, SceneDetector, Summarizer,
};
pub use queue::Queue;
pub use secrets::SecretsProvider;
pub use task_launcher::{PipelineRunner, TaskLauncher};
pub use vector_store::VectorStore;
