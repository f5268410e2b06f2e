//! Value objects shared across layers.

pub mod media;
pub mod messages;
pub mod search;
pub mod storage;

pub use media::{SpeakerTurn, Waveform};
pub use messages::{QueueDelivery, TaskInput, WorkMessage};
pub use search::{MetadataFilter, SearchFilters, SearchResult, VectorRecord};
pub use storage::{BlobInfo, PresignedUpload};
