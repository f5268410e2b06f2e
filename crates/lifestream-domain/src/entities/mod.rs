//! Domain entities.

pub mod chunk;
pub mod context;
pub mod failure;
pub mod job;
pub mod speaker;
pub mod stage;
pub mod summary;

pub use chunk::{Chunk, SourceType};
pub use context::{AudioSegment, Keyframe, SynchronizedContext};
pub use failure::FailureReport;
pub use job::{Job, JobState};
pub use speaker::{SpeakerInfo, SpeakerRegistry};
pub use stage::PipelineStage;
pub use summary::{
    ContextType, DailySummary, Participant, SourceReliability, TimeBlock, VideoMetadata,
};
