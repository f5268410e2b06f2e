//! Memory Indexer Use Case
//!
//! # Overview
//! The `MemoryIndexer` turns a finished daily summary into vector-store
//! records: chunk, embed in batches, upsert under deterministic chunk ids.
//! Embedding calls retry with exponential backoff; a batch that exhausts
//! its retries is dropped with a warning and the remaining batches still
//! index, so indexing never fails the job.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use lifestream_domain::entities::{Chunk, DailySummary};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{EmbeddingProvider, VectorStore};
use lifestream_domain::value_objects::VectorRecord;

use crate::pipeline::chunking::chunks_from_summary;
use crate::settings::IndexerSettings;

/// Result of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOutcome {
    /// Chunks successfully embedded and upserted
    pub chunks_indexed: usize,
    /// Batches dropped after exhausting their retries
    pub batches_failed: usize,
}

/// Embeds summary chunks and upserts them into the vector store.
pub struct MemoryIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    settings: IndexerSettings,
}

impl MemoryIndexer {
    /// Create a new indexer with injected dependencies
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            settings,
        }
    }

    /// Index one summary. Re-indexing the same summary upserts the same
    /// chunk ids in place.
    ///
    /// # Errors
    /// Only configuration-level faults error out (e.g. a zero batch size);
    /// embedding and upsert faults degrade per batch.
    pub async fn index_summary(&self, summary: &DailySummary) -> Result<IndexOutcome> {
        if self.settings.embedding_batch_size == 0 {
            return Err(Error::config("embedding_batch_size must be positive"));
        }

        let chunks = chunks_from_summary(summary, self.settings.transcript_chunk_chars);
        if chunks.is_empty() {
            info!(video_id = %summary.video_id, "Nothing to index");
            return Ok(IndexOutcome::default());
        }

        let mut outcome = IndexOutcome::default();
        for batch in chunks.chunks(self.settings.embedding_batch_size) {
            match self.index_batch(batch).await {
                Ok(()) => outcome.chunks_indexed += batch.len(),
                Err(e) => {
                    outcome.batches_failed += 1;
                    warn!(
                        video_id = %summary.video_id,
                        batch_size = batch.len(),
                        error = %e,
                        "Dropping chunk batch after exhausted retries"
                    );
                }
            }
        }

        info!(
            video_id = %summary.video_id,
            chunks_indexed = outcome.chunks_indexed,
            batches_failed = outcome.batches_failed,
            "Summary indexed"
        );
        Ok(outcome)
    }

    async fn index_batch(&self, batch: &[Chunk]) -> Result<()> {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_with_retry(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(Error::embedding(format!(
                "backend returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }

        let records = batch
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorRecord {
                id: chunk.chunk_id.clone(),
                vector,
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
            })
            .collect();
        self.store.upsert(records).await
    }

    async fn embed_with_retry(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let attempts = self.settings.retry_count.max(1);
        let mut last_error = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                let backoff =
                    Duration::from_millis(self.settings.retry_backoff_ms << (attempt - 1));
                tokio::time::sleep(backoff).await;
            }
            match self.embedder.embed_batch(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "Embedding call failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error::embedding("embedding backend never responded")))
    }
}
