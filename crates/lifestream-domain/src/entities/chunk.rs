//! The indexable unit derived from a daily summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What part of the summary a chunk was derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Block metadata plus its transcript summary
    SummaryBlock,
    /// A slice of a long transcript
    TranscriptBlock,
    /// A single action item
    ActionItem,
    /// A visual scene description
    Scene,
}

impl SourceType {
    /// Wire name of the source type (`snake_case`, matches the serde rename)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SummaryBlock => "summary_block",
            Self::TranscriptBlock => "transcript_block",
            Self::ActionItem => "action_item",
            Self::Scene => "scene",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An embeddable unit of text with temporal provenance.
///
/// `chunk_id` is a deterministic hash of
/// `(video_id, start_seconds, end_seconds, source_type)`, so re-running
/// chunking on identical input produces identical ids and re-indexing is an
/// in-place upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic identifier, stable across re-runs
    pub chunk_id: String,
    /// Source video identifier
    pub video_id: String,
    /// Calendar date of the footage, `YYYY-MM-DD`
    pub date: String,
    /// Chunk start, seconds from the start of the video
    pub start_seconds: f64,
    /// Chunk end, seconds from the start of the video
    pub end_seconds: f64,
    /// Speaker ids present in the chunk
    pub speakers: Vec<String>,
    /// What the chunk was derived from
    pub source_type: SourceType,
    /// The content to embed
    pub text: String,
    /// Flat metadata for filtering (location, activity, context type, ...)
    pub metadata: BTreeMap<String, String>,
}

impl Chunk {
    /// Compute the canonical chunk id.
    ///
    /// Input fields are joined with `|` in fixed order, seconds formatted
    /// with millisecond precision, hashed with SHA-256, and hex-encoded.
    pub fn compute_id(
        video_id: &str,
        start_seconds: f64,
        end_seconds: f64,
        source_type: SourceType,
    ) -> String {
        let canonical = format!(
            "{video_id}|{start_seconds:.3}|{end_seconds:.3}|{source_type}",
            source_type = source_type.as_str()
        );
        let digest = Sha256::digest(canonical.as_bytes());
        hex::encode(digest)
    }
}
