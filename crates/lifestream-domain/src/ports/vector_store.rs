//! Vector store port.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{MetadataFilter, SearchResult, VectorRecord};

/// Vector index over summary chunks.
///
/// Upserting under an existing id overwrites in place, so re-indexing a
/// summary is idempotent. Concurrent upserts under distinct ids are safe.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Retrieve the `top_k` records closest to `vector`, optionally
    /// restricted by a metadata filter, ordered by descending score.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>>;

    /// Delete records by id. Missing ids are ignored.
    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Number of records in the index.
    async fn count(&self) -> Result<usize>;

    /// Name of this provider (e.g. "memory").
    fn provider_name(&self) -> &str;
}
