//! Deterministic offline model backends.
//!
//! Outputs derive only from the inputs (byte content, transcript text), so
//! identical uploads produce identical summaries, chunk ids, and vectors —
//! which is what the idempotency and re-indexing contracts rely on in
//! tests and local development.

use std::path::Path;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use lifestream_domain::entities::{
    AudioSegment, ContextType, Keyframe, SourceReliability, SynchronizedContext,
};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{
    AnswerSynthesizer, AsrEngine, BlockSummary, Diarizer, EmbeddingProvider, KeyframeExtractor,
    MediaProbe, MeetingClassifier, SceneDetector, Summarizer,
};
use lifestream_domain::value_objects::{SpeakerTurn, Waveform};

/// Bytes of source video per second of content, used to derive durations.
const BYTES_PER_SECOND: f64 = 160_000.0;

/// Diarized turn length in seconds.
const TURN_SECONDS: f64 = 30.0;

const PHRASES: [&str; 8] = [
    "let's walk through the plan for today",
    "the frontend work is nearly finished",
    "we still need to review the storage migration",
    "I'll follow up with the design team",
    "the demo went better than expected",
    "let's schedule the retro for Friday",
    "the metrics dashboard needs new charts",
    "remember to update the release notes",
];

fn digest64(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Derives waveform and duration from the file bytes.
///
/// An all-zero (or empty) file reads as silent: the waveform is empty, so
/// diarization and ASR naturally yield nothing downstream.
pub struct MockMediaProbe;

impl MockMediaProbe {
    async fn read(&self, video: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(video)
            .await
            .map_err(|e| Error::media(format!("cannot read video '{}': {e}", video.display())))
    }
}

#[async_trait]
impl MediaProbe for MockMediaProbe {
    async fn extract_audio(&self, video: &Path) -> Result<Waveform> {
        let bytes = self.read(video).await?;
        if bytes.is_empty() || bytes.iter().all(|b| *b == 0) {
            return Ok(Waveform {
                samples: Vec::new(),
                sample_rate: 16_000,
            });
        }
        let duration = bytes.len() as f64 / BYTES_PER_SECOND;
        let samples = (0..(duration * 16_000.0) as usize)
            .map(|i| {
                let byte = bytes[i % bytes.len()];
                (f32::from(byte) - 128.0) / 128.0
            })
            .collect();
        Ok(Waveform {
            samples,
            sample_rate: 16_000,
        })
    }

    async fn probe_duration(&self, video: &Path) -> Result<f64> {
        let bytes = self.read(video).await?;
        Ok(bytes.len() as f64 / BYTES_PER_SECOND)
    }

    fn provider_name(&self) -> &str {
        "mock-probe"
    }
}

/// Alternates two speakers in fixed-length turns.
pub struct MockDiarizer;

#[async_trait]
impl Diarizer for MockDiarizer {
    async fn diarize(&self, waveform: &Waveform) -> Result<Vec<SpeakerTurn>> {
        if waveform.is_empty() {
            return Ok(Vec::new());
        }
        let duration = waveform.duration_seconds();
        let mut turns = Vec::new();
        let mut start = 0.0;
        let mut speaker = 1;
        while start < duration {
            let end = (start + TURN_SECONDS).min(duration);
            turns.push(SpeakerTurn {
                start_seconds: start,
                end_seconds: end,
                speaker_id: format!("Speaker_{speaker:02}"),
            });
            speaker = if speaker == 1 { 2 } else { 1 };
            start = end;
        }
        Ok(turns)
    }

    fn provider_name(&self) -> &str {
        "mock-diarizer"
    }
}

/// Emits one phrase per diarized turn, chosen deterministically.
///
/// The "faster" variant models the `use_faster_asr` backend switch; both
/// produce identical output offline and differ only in name.
pub struct MockAsrEngine {
    fast: bool,
}

impl MockAsrEngine {
    /// The standard backend.
    pub fn new() -> Self {
        Self { fast: false }
    }

    /// The faster backend selected by `use_faster_asr`.
    pub fn faster() -> Self {
        Self { fast: true }
    }
}

impl Default for MockAsrEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsrEngine for MockAsrEngine {
    async fn transcribe(
        &self,
        waveform: &Waveform,
        turns: &[SpeakerTurn],
    ) -> Result<Vec<AudioSegment>> {
        if waveform.is_empty() {
            return Ok(Vec::new());
        }
        let segments = turns
            .iter()
            .map(|turn| {
                let seed = digest64(&format!("{}|{:.3}", turn.speaker_id, turn.start_seconds));
                AudioSegment {
                    start_seconds: turn.start_seconds,
                    end_seconds: turn.end_seconds,
                    speaker_id: turn.speaker_id.clone(),
                    text: PHRASES[(seed % PHRASES.len() as u64) as usize].to_owned(),
                }
            })
            .collect();
        Ok(segments)
    }

    fn provider_name(&self) -> &str {
        if self.fast { "mock-asr-fast" } else { "mock-asr" }
    }
}

/// Emits a boundary every 30 seconds of content.
pub struct MockSceneDetector;

#[async_trait]
impl SceneDetector for MockSceneDetector {
    async fn detect(&self, video: &Path, frame_skip: u32) -> Result<Vec<f64>> {
        let bytes = tokio::fs::read(video)
            .await
            .map_err(|e| Error::media(format!("cannot read video '{}': {e}", video.display())))?;
        let duration = bytes.len() as f64 / BYTES_PER_SECOND;
        let step = 30.0 * f64::from(frame_skip.max(1));
        let mut boundaries = Vec::new();
        let mut t = 0.0;
        while t < duration {
            boundaries.push(t);
            t += step;
        }
        Ok(boundaries)
    }

    fn provider_name(&self) -> &str {
        "mock-scenes"
    }
}

/// Emits a tiny placeholder image per boundary.
pub struct MockKeyframeExtractor;

#[async_trait]
impl KeyframeExtractor for MockKeyframeExtractor {
    async fn extract(&self, _video: &Path, boundaries: &[f64]) -> Result<Vec<Keyframe>> {
        Ok(boundaries
            .iter()
            .map(|ts| Keyframe {
                timestamp_seconds: *ts,
                image: vec![0x89, 0x50, 0x4E, 0x47],
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "mock-keyframes"
    }
}

/// Classifies by distinct speaker count.
pub struct MockMeetingClassifier;

#[async_trait]
impl MeetingClassifier for MockMeetingClassifier {
    async fn classify(&self, context: &SynchronizedContext) -> Result<ContextType> {
        let mut speakers: Vec<&str> = context
            .audio_segments
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| s.speaker_id.as_str())
            .collect();
        speakers.sort_unstable();
        speakers.dedup();
        Ok(match speakers.len() {
            0 => ContextType::Unknown,
            1 => ContextType::Vlog,
            _ => ContextType::Meeting,
        })
    }

    fn provider_name(&self) -> &str {
        "mock-classifier"
    }
}

/// Builds a block summary straight from the window's transcript.
pub struct MockSummarizer;

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, context: &SynchronizedContext) -> Result<BlockSummary> {
        let transcript = context.labeled_transcript();
        let mut speakers: Vec<String> = context
            .audio_segments
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| s.speaker_id.clone())
            .collect();
        speakers.sort();
        speakers.dedup();

        // No speech in the window: return an empty activity and let the
        // orchestrator's sanitizer substitute its placeholder.
        let activity = transcript
            .lines()
            .next()
            .and_then(|line| line.split_once(": ").map(|(_, text)| text))
            .map_or_else(String::new, capitalize);

        let action_items = context
            .audio_segments
            .iter()
            .filter(|s| s.text.contains("need to") || s.text.contains("remember to"))
            .map(|s| capitalize(&s.text))
            .collect();

        Ok(BlockSummary {
            activity,
            location: String::new(),
            participants: speakers,
            transcript_summary: summarize_text(&transcript),
            action_items,
            source_reliability: if context.has_audio() && context.has_visual() {
                SourceReliability::High
            } else {
                SourceReliability::Medium
            },
            context_type: ContextType::Unknown,
        })
    }

    fn provider_name(&self) -> &str {
        "mock-summarizer"
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn summarize_text(transcript: &str) -> String {
    const BUDGET: usize = 400;
    if transcript.len() <= BUDGET {
        return transcript.to_owned();
    }
    let mut cut: String = transcript.chars().take(BUDGET).collect();
    cut.push('…');
    cut
}

/// Bag-of-words embedding: each token hashes to a dimension, so texts
/// sharing vocabulary land close under cosine similarity.
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    /// Create a provider emitting vectors of `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let index = (digest64(token) % self.dimensions as u64) as usize;
            vector[index] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        } else {
            vector[0] = 1.0;
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "mock-embeddings"
    }
}

/// Quotes the best-matching chunk back at the caller.
pub struct MockAnswerSynthesizer;

#[async_trait]
impl AnswerSynthesizer for MockAnswerSynthesizer {
    async fn synthesize(&self, query: &str, contexts: &[String]) -> Result<String> {
        let top = contexts.first().map(String::as_str).unwrap_or("");
        Ok(format!(
            "Regarding \"{query}\": {top} ({} related moments found)",
            contexts.len()
        ))
    }

    fn provider_name(&self) -> &str {
        "mock-synthesizer"
    }
}
