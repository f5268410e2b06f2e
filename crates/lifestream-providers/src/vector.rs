//! In-memory vector store with cosine similarity and metadata filtering.

use async_trait::async_trait;
use dashmap::DashMap;

use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::VectorStore;
use lifestream_domain::value_objects::{MetadataFilter, SearchResult, VectorRecord};

/// Cosine-similarity index keyed by chunk id.
///
/// Scores are mapped from `[-1, 1]` into `[0, 1]` so callers can treat
/// them uniformly as "higher is closer" regardless of backend.
#[derive(Default)]
pub struct InMemoryVectorStore {
    records: DashMap<String, VectorRecord>,
}

impl InMemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_score(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    (cosine + 1.0) / 2.0
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        for record in records {
            if record.vector.is_empty() {
                return Err(Error::vector_store(format!(
                    "record '{}' has an empty vector",
                    record.id
                )));
            }
            self.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let mut hits: Vec<SearchResult> = self
            .records
            .iter()
            .filter(|entry| filter.is_none_or(|f| f.matches(&entry.metadata)))
            .map(|entry| SearchResult {
                chunk_id: entry.id.clone(),
                score: cosine_score(vector, &entry.vector),
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.records.remove(id);
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
