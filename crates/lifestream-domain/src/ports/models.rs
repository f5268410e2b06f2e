//! Model strategy ports.
//!
//! Each ML component the pipeline calls is polymorphic over a small
//! capability set with one uniform call shape, so mocks and production
//! backends swap without conditional code paths. Whether a component's
//! failure is fatal is decided by the stage policy
//! ([`crate::entities::PipelineStage::is_fatal`]), not by the component.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{AudioSegment, ContextType, Keyframe, SourceReliability, SynchronizedContext};
use crate::error::Result;
use crate::value_objects::{SpeakerTurn, Waveform};

/// Demuxing and decoding of the uploaded video file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Decode the audio track to a 16 kHz mono PCM waveform.
    ///
    /// A video with no audio track yields an empty waveform, not an error.
    async fn extract_audio(&self, video: &Path) -> Result<Waveform>;

    /// Probe the container for its stream duration in seconds.
    async fn probe_duration(&self, video: &Path) -> Result<f64>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Speaker diarization over a waveform.
#[async_trait]
pub trait Diarizer: Send + Sync {
    /// Segment the waveform into speaker turns.
    async fn diarize(&self, waveform: &Waveform) -> Result<Vec<SpeakerTurn>>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Speech recognition over a waveform, attributed via diarized turns.
#[async_trait]
pub trait AsrEngine: Send + Sync {
    /// Transcribe the waveform into speaker-attributed segments.
    ///
    /// `turns` may come from the diarizer or from the single-speaker
    /// fallback; implementations attribute text to the covering turn.
    async fn transcribe(
        &self,
        waveform: &Waveform,
        turns: &[SpeakerTurn],
    ) -> Result<Vec<AudioSegment>>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Visual scene boundary detection.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    /// Detect scene boundary timestamps (seconds), ascending.
    ///
    /// `frame_skip` trades granularity for speed; a video with no scene
    /// changes yields an empty list, not an error.
    async fn detect(&self, video: &Path, frame_skip: u32) -> Result<Vec<f64>>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Representative frame extraction near scene boundaries.
#[async_trait]
pub trait KeyframeExtractor: Send + Sync {
    /// Extract one keyframe per boundary timestamp.
    async fn extract(&self, video: &Path, boundaries: &[f64]) -> Result<Vec<Keyframe>>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Meeting-or-vlog classification of a context window.
#[async_trait]
pub trait MeetingClassifier: Send + Sync {
    /// Classify the window's content.
    async fn classify(&self, context: &SynchronizedContext) -> Result<ContextType>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// The structured response the summarizer LLM returns per context window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockSummary {
    /// What was happening in the window
    pub activity: String,
    /// Where it happened, if inferable
    #[serde(default)]
    pub location: String,
    /// Speaker ids the model attributed content to
    #[serde(default)]
    pub participants: Vec<String>,
    /// Condensed transcript
    #[serde(default)]
    pub transcript_summary: String,
    /// Action items surfaced in the window
    #[serde(default)]
    pub action_items: Vec<String>,
    /// Model confidence in its inputs
    #[serde(default)]
    pub source_reliability: SourceReliability,
    /// Model's own meeting-or-vlog call, used when classification degraded
    #[serde(default)]
    pub context_type: ContextType,
}

/// LLM summarization of one context window.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the window into structured fields.
    ///
    /// The transcript is speaker-labeled; the visual context is a short
    /// description of the window's keyframes.
    async fn summarize(&self, context: &SynchronizedContext) -> Result<BlockSummary>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// Text embedding backend, shared by indexing and the query path.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input, in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}

/// LLM answer synthesis over retrieved chunks.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Produce a single natural-language answer from the query and the
    /// retrieved chunk texts.
    async fn synthesize(&self, query: &str, contexts: &[String]) -> Result<String>;

    /// Name of this backend.
    fn provider_name(&self) -> &str;
}
