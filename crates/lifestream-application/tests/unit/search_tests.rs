//! Query path: validation, filters, min-score cut, and degrade-only
//! synthesis.

use std::sync::Arc;

use lifestream_application::settings::{IndexerSettings, SearchSettings};
use lifestream_application::use_cases::{MemoryIndexer, QueryRequest, SearchService};
use lifestream_domain::entities::{
    ContextType, DailySummary, SourceReliability, TimeBlock, VideoMetadata,
};
use lifestream_domain::error::Error;
use lifestream_domain::value_objects::SearchFilters;
use lifestream_providers::models::{MockAnswerSynthesizer, MockEmbeddingProvider};
use lifestream_providers::vector::InMemoryVectorStore;

use crate::test_utils::{FailingSynthesizer, FailingVectorStore};

fn summary_for_date(video_id: &str, date: &str, topic: &str) -> DailySummary {
    DailySummary {
        video_id: video_id.to_owned(),
        date: date.to_owned(),
        video_metadata: VideoMetadata {
            object_key: format!("uploads/{video_id}/day.mp4"),
            duration_seconds: 300.0,
        },
        time_blocks: vec![TimeBlock {
            start_seconds: 0.0,
            end_seconds: 300.0,
            activity: format!("Discussion about the {topic}"),
            location: String::new(),
            participants: Vec::new(),
            transcript_summary: format!("The team discussed the {topic} roadmap in depth."),
            action_items: Vec::new(),
            context_type: ContextType::Meeting,
            source_reliability: SourceReliability::High,
        }],
    }
}

async fn indexed_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = MemoryIndexer::new(
        Arc::new(MockEmbeddingProvider::new(64)),
        store.clone(),
        IndexerSettings::default(),
    );
    indexer
        .index_summary(&summary_for_date("vid-jan1", "2024-01-01", "backend"))
        .await
        .expect("index jan1");
    indexer
        .index_summary(&summary_for_date("vid-jan2", "2024-01-02", "frontend"))
        .await
        .expect("index jan2");
    store
}

fn service(store: Arc<InMemoryVectorStore>) -> SearchService {
    SearchService::new(
        Arc::new(MockEmbeddingProvider::new(64)),
        store,
        Some(Arc::new(MockAnswerSynthesizer)),
        SearchSettings::default(),
    )
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let service = service(indexed_store().await);

    let empty = service
        .query(QueryRequest {
            query: "   ".to_owned(),
            top_k: None,
            min_score: None,
            filters: None,
        })
        .await;
    assert!(matches!(empty, Err(Error::InvalidArgument { .. })));

    let oversized = service
        .query(QueryRequest {
            query: "what happened".to_owned(),
            top_k: Some(51),
            min_score: None,
            filters: None,
        })
        .await;
    assert!(matches!(oversized, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn query_returns_ranked_results_and_an_answer() {
    let service = service(indexed_store().await);

    let response = service
        .query(QueryRequest {
            query: "what was discussed about the frontend".to_owned(),
            top_k: Some(3),
            min_score: None,
            filters: None,
        })
        .await
        .expect("query succeeds");

    assert!(!response.results.is_empty());
    assert_eq!(response.total_results, response.results.len());
    assert!(response.answer.is_some());
    // Vocabulary overlap must rank the frontend chunk first.
    assert_eq!(
        response.results[0].metadata.get("video_id").map(String::as_str),
        Some("vid-jan2")
    );
}

#[tokio::test]
async fn date_filter_restricts_results() {
    let service = service(indexed_store().await);

    let response = service
        .query(QueryRequest {
            query: "frontend".to_owned(),
            top_k: Some(10),
            min_score: None,
            filters: Some(SearchFilters {
                date: Some("2024-01-02".to_owned()),
                ..SearchFilters::default()
            }),
        })
        .await
        .expect("query succeeds");

    assert!(!response.results.is_empty());
    for result in &response.results {
        assert_eq!(
            result.metadata.get("date").map(String::as_str),
            Some("2024-01-02")
        );
    }
}

#[tokio::test]
async fn min_score_cuts_weak_results() {
    let service = service(indexed_store().await);

    let response = service
        .query(QueryRequest {
            query: "completely unrelated grocery topics".to_owned(),
            top_k: Some(10),
            min_score: Some(0.99),
            filters: None,
        })
        .await
        .expect("query succeeds");
    for result in &response.results {
        assert!(result.score >= 0.99);
    }
}

#[tokio::test]
async fn synthesis_failure_degrades_to_results_only() {
    let store = indexed_store().await;
    let service = SearchService::new(
        Arc::new(MockEmbeddingProvider::new(64)),
        store,
        Some(Arc::new(FailingSynthesizer)),
        SearchSettings::default(),
    );

    let response = service
        .query(QueryRequest {
            query: "frontend roadmap".to_owned(),
            top_k: Some(5),
            min_score: None,
            filters: None,
        })
        .await
        .expect("query still succeeds");

    assert!(!response.results.is_empty());
    assert!(response.answer.is_none());
}

#[tokio::test]
async fn unreachable_store_maps_to_service_unavailable() {
    let service = SearchService::new(
        Arc::new(MockEmbeddingProvider::new(64)),
        Arc::new(FailingVectorStore),
        None,
        SearchSettings::default(),
    );

    let result = service
        .query(QueryRequest {
            query: "anything".to_owned(),
            top_k: None,
            min_score: None,
            filters: None,
        })
        .await;
    assert!(matches!(result, Err(Error::Unavailable { .. })));
}
