//! Indexer batching, retry, and degradation behavior.

use std::sync::Arc;

use lifestream_application::settings::IndexerSettings;
use lifestream_application::use_cases::MemoryIndexer;
use lifestream_domain::entities::{
    ContextType, DailySummary, Participant, SourceReliability, TimeBlock, VideoMetadata,
};
use lifestream_domain::ports::VectorStore as _;
use lifestream_providers::vector::InMemoryVectorStore;

use crate::test_utils::FlakyEmbeddingProvider;

fn summary(video_id: &str, date: &str, action_items: usize) -> DailySummary {
    DailySummary {
        video_id: video_id.to_owned(),
        date: date.to_owned(),
        video_metadata: VideoMetadata {
            object_key: format!("uploads/{video_id}/day.mp4"),
            duration_seconds: 600.0,
        },
        time_blocks: vec![TimeBlock {
            start_seconds: 0.0,
            end_seconds: 600.0,
            activity: "Team sync about the frontend".to_owned(),
            location: "Office".to_owned(),
            participants: vec![Participant {
                speaker_id: "Speaker_01".to_owned(),
                display_name: "Grace".to_owned(),
                role: None,
            }],
            transcript_summary: "Discussed the frontend milestones.".to_owned(),
            action_items: (0..action_items)
                .map(|i| format!("Follow-up number {i}"))
                .collect(),
            context_type: ContextType::Meeting,
            source_reliability: SourceReliability::High,
        }],
    }
}

fn settings(batch_size: usize, retry_count: usize) -> IndexerSettings {
    IndexerSettings {
        embedding_batch_size: batch_size,
        retry_count,
        retry_backoff_ms: 1,
        transcript_chunk_chars: 2_000,
    }
}

#[tokio::test]
async fn transient_embedding_failures_are_retried() {
    let embedder = Arc::new(FlakyEmbeddingProvider::new(2));
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = MemoryIndexer::new(embedder.clone(), store.clone(), settings(64, 3));

    let outcome = indexer
        .index_summary(&summary("vid", "2024-01-01", 1))
        .await
        .expect("indexing succeeds");

    assert_eq!(outcome.batches_failed, 0);
    assert_eq!(outcome.chunks_indexed, 2);
    assert_eq!(store.count().await.expect("count"), 2);
    assert_eq!(embedder.calls(), 3, "two failures then one success");
}

#[tokio::test]
async fn exhausted_batches_are_dropped_without_failing() {
    let embedder = Arc::new(FlakyEmbeddingProvider::new(usize::MAX));
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = MemoryIndexer::new(embedder, store.clone(), settings(64, 2));

    let outcome = indexer
        .index_summary(&summary("vid", "2024-01-01", 0))
        .await
        .expect("indexing degrades, not fails");

    assert_eq!(outcome.chunks_indexed, 0);
    assert_eq!(outcome.batches_failed, 1);
    assert_eq!(store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn batches_split_by_configured_size() {
    let embedder = Arc::new(FlakyEmbeddingProvider::new(0));
    let store = Arc::new(InMemoryVectorStore::new());
    // 1 summary block + 5 action items = 6 chunks → 3 batches of 2.
    let indexer = MemoryIndexer::new(embedder.clone(), store.clone(), settings(2, 1));

    let outcome = indexer
        .index_summary(&summary("vid", "2024-01-01", 5))
        .await
        .expect("indexing succeeds");

    assert_eq!(outcome.chunks_indexed, 6);
    assert_eq!(embedder.calls(), 3);
}
