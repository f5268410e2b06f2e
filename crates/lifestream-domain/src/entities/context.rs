//! Temporal join products: audio segments, keyframes, and the
//! synchronized context windows passed to the summarizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A speaker-attributed transcript span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSegment {
    /// Segment start, seconds
    pub start_seconds: f64,
    /// Segment end, seconds
    pub end_seconds: f64,
    /// Opaque speaker id from diarization
    pub speaker_id: String,
    /// Transcribed text
    pub text: String,
}

impl AudioSegment {
    /// Whether this segment overlaps the `[start, end)` window.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start_seconds < end && self.end_seconds > start
    }
}

/// A representative frame extracted near a scene boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    /// Frame timestamp, seconds
    pub timestamp_seconds: f64,
    /// Encoded image bytes
    #[serde(with = "serde_bytes_hex")]
    pub image: Vec<u8>,
}

/// A time window joining the audio and visual signals that fall inside it.
///
/// When the total content duration is shorter than the window, a single
/// context covers the whole video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynchronizedContext {
    /// Window start, seconds
    pub start_seconds: f64,
    /// Window end, seconds
    pub end_seconds: f64,
    /// Audio segments overlapping the window
    pub audio_segments: Vec<AudioSegment>,
    /// Keyframes inside the window
    pub keyframes: Vec<Keyframe>,
    /// Free-form metadata attached by later stages
    pub metadata: BTreeMap<String, String>,
}

impl SynchronizedContext {
    /// Whether any speech falls in this window.
    pub fn has_audio(&self) -> bool {
        self.audio_segments
            .iter()
            .any(|s| !s.text.trim().is_empty())
    }

    /// Whether any visual signal falls in this window.
    pub fn has_visual(&self) -> bool {
        !self.keyframes.is_empty()
    }

    /// Speaker-labeled transcript of the window, one line per segment.
    pub fn labeled_transcript(&self) -> String {
        self.audio_segments
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| format!("{}: {}", s.speaker_id, s.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

mod serde_bytes_hex {
    //! Keyframe images serialize as hex strings so summary artifacts stay
    //! valid JSON without pulling a base64 dependency into the domain.

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
