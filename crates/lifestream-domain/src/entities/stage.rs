//! Pipeline stage names, ordering, and degradation policy.
//!
//! The degradation policy lives here in one place: the orchestrator consults
//! [`PipelineStage::is_fatal`] uniformly instead of scattering
//! catch-and-continue logic across stage implementations.

use serde::{Deserialize, Serialize};

/// A named stage of the processing pipeline, in canonical order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Fetch the uploaded object into the task workspace
    Download,
    /// Decode to a 16 kHz mono waveform
    AudioExtraction,
    /// Speaker turns from the waveform (degrades to single speaker)
    Diarization,
    /// Speech-to-text over the waveform
    Asr,
    /// Visual scene boundaries (degrades to a fixed interval)
    SceneDetection,
    /// Representative frames per scene (degrades to empty)
    Keyframes,
    /// Join audio segments and keyframes into time windows
    Synchronization,
    /// Meeting-or-vlog labelling (degrades to a heuristic)
    MeetingClassification,
    /// LLM summarization into time blocks
    Summarization,
    /// Persist summary artifacts to the blob store
    Upload,
    /// Embed and upsert chunks into the vector store (job completes even if
    /// this fails)
    Indexing,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [Self; 11] = [
        Self::Download,
        Self::AudioExtraction,
        Self::Diarization,
        Self::Asr,
        Self::SceneDetection,
        Self::Keyframes,
        Self::Synchronization,
        Self::MeetingClassification,
        Self::Summarization,
        Self::Upload,
        Self::Indexing,
    ];

    /// Wire name of the stage (`snake_case`, matches the serde rename)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::AudioExtraction => "audio_extraction",
            Self::Diarization => "diarization",
            Self::Asr => "asr",
            Self::SceneDetection => "scene_detection",
            Self::Keyframes => "keyframes",
            Self::Synchronization => "synchronization",
            Self::MeetingClassification => "meeting_classification",
            Self::Summarization => "summarization",
            Self::Upload => "upload",
            Self::Indexing => "indexing",
        }
    }

    /// Whether a failure of this stage fails the job.
    ///
    /// Non-fatal stages degrade: diarization falls back to a single
    /// speaker, scene detection to fixed-interval boundaries, keyframes to
    /// none, classification to a heuristic, and indexing to a logged
    /// warning with the job still completing.
    pub fn is_fatal(self) -> bool {
        !matches!(
            self,
            Self::Diarization
                | Self::SceneDetection
                | Self::Keyframes
                | Self::MeetingClassification
                | Self::Indexing
        )
    }

    /// Zero-based position in the canonical order.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Progress value once this stage has completed.
    pub fn progress_after(self) -> f64 {
        (self.index() + 1) as f64 / Self::ALL.len() as f64
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
