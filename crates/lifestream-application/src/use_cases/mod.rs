//! Application use cases.

pub mod dispatcher;
pub mod indexer;
pub mod orchestrator;
pub mod search_service;
pub mod upload_service;

pub use dispatcher::Dispatcher;
pub use indexer::{IndexOutcome, MemoryIndexer};
pub use orchestrator::Orchestrator;
pub use search_service::{QueryRequest, QueryResponse, SearchService};
pub use upload_service::{PresignGrant, SummaryArtifacts, UploadService};
