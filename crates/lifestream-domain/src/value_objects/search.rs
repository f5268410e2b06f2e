//! Search and vector-index value objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::chunk::SourceType;

/// Caller-facing filters accepted by the query endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Restrict to chunks from this calendar date (`YYYY-MM-DD`)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    /// Restrict to chunks from this video
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub video_id: Option<String>,
    /// Restrict to chunks mentioning any of these speakers
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speaker_ids: Option<Vec<String>>,
    /// Restrict to chunks of these source types
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_types: Option<Vec<SourceType>>,
}

impl SearchFilters {
    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.video_id.is_none()
            && self.speaker_ids.is_none()
            && self.source_types.is_none()
    }
}

/// The vector store's filter dialect: exact matches plus any-of lists over
/// flattened metadata fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    /// Field must equal the value
    pub equals: Vec<(String, String)>,
    /// Field must equal one of the values
    pub any_of: Vec<(String, Vec<String>)>,
}

impl MetadataFilter {
    /// Whether a flattened metadata map satisfies this filter.
    ///
    /// `any_of` entries match list-valued fields stored as comma-joined
    /// strings (e.g. `speakers`).
    pub fn matches(&self, metadata: &BTreeMap<String, String>) -> bool {
        for (field, expected) in &self.equals {
            if metadata.get(field) != Some(expected) {
                return false;
            }
        }
        for (field, candidates) in &self.any_of {
            let Some(value) = metadata.get(field) else {
                return false;
            };
            let members: Vec<&str> = value.split(',').map(str::trim).collect();
            if !candidates.iter().any(|c| members.contains(&c.as_str())) {
                return false;
            }
        }
        true
    }
}

/// A vector plus its text and flattened metadata, keyed by chunk id.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    /// Chunk id; upserting the same id overwrites in place
    pub id: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// The embedded text, returned with search hits
    pub text: String,
    /// Flattened metadata for filtering
    pub metadata: BTreeMap<String, String>,
}

/// A single search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Chunk id of the hit
    pub chunk_id: String,
    /// Similarity score in `[0, 1]`, higher is closer
    pub score: f32,
    /// The chunk text
    pub text: String,
    /// Flattened chunk metadata
    pub metadata: BTreeMap<String, String>,
}
