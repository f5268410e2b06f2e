//! The daily summary composite produced by the processing pipeline.

use serde::{Deserialize, Serialize};

/// Classification of a time block's content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    /// Multi-party conversation with meeting structure
    Meeting,
    /// Single-speaker narration or commentary
    Vlog,
    /// Could not be classified
    #[default]
    Unknown,
}

/// How much the summarizer trusted its inputs for a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceReliability {
    /// Clean transcript and visual context
    High,
    /// Partial or noisy inputs
    #[default]
    Medium,
    /// Degraded inputs (no diarization, empty visuals, ...)
    Low,
}

/// A person present in a time block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Opaque diarizer identifier (e.g. `Speaker_01`)
    pub speaker_id: String,
    /// Resolved display name, or the unidentified-speaker placeholder
    pub display_name: String,
    /// Role from the speaker registry, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A contiguous period of the day with its summarized content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeBlock {
    /// Block start, seconds from the start of the video
    pub start_seconds: f64,
    /// Block end, seconds from the start of the video
    pub end_seconds: f64,
    /// What was happening
    pub activity: String,
    /// Where it happened, if inferable
    pub location: String,
    /// Who was present
    pub participants: Vec<Participant>,
    /// Condensed transcript of the block
    pub transcript_summary: String,
    /// Action items surfaced in the block
    pub action_items: Vec<String>,
    /// Meeting-or-vlog classification
    pub context_type: ContextType,
    /// Summarizer confidence in its inputs
    pub source_reliability: SourceReliability,
}

/// Provenance of the source video carried on the summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    /// Blob-store key of the raw upload
    pub object_key: String,
    /// Stream duration in seconds, as probed during audio extraction
    pub duration_seconds: f64,
}

/// The structured output of the processing pipeline: an ordered list of
/// time blocks plus provenance. Serialized as JSON and also rendered to
/// Markdown with a stable format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    /// Identifier of the source video (the job id)
    pub video_id: String,
    /// Calendar date of the footage, `YYYY-MM-DD`
    pub date: String,
    /// Source provenance
    pub video_metadata: VideoMetadata,
    /// Ordered time blocks
    pub time_blocks: Vec<TimeBlock>,
}

impl DailySummary {
    /// All distinct speaker ids across the summary's blocks.
    pub fn speaker_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .time_blocks
            .iter()
            .flat_map(|b| b.participants.iter().map(|p| p.speaker_id.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
