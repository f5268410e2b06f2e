//! Pipeline behavior end to end over mock model backends.

use lifestream_domain::entities::{DailySummary, JobState, PipelineStage};
use lifestream_domain::ports::{PipelineRunner, VectorStore as _};

use crate::test_utils::{
    FailingAsrEngine, FailingDiarizer, OrchestratorHarness, silent_video_bytes, video_bytes,
};

use std::sync::Arc;

use lifestream_domain::ports::{BlobStore as _, JobTable as _};
use lifestream_providers::models::MockAsrEngine;

async fn fetch_summary(harness: &OrchestratorHarness, job_id: &str) -> DailySummary {
    let bytes = harness
        .blob
        .get(&format!("results/{job_id}/summary.json"))
        .await
        .expect("summary.json must exist");
    serde_json::from_slice(&bytes).expect("summary parses")
}

#[tokio::test]
async fn happy_path_completes_with_artifacts_and_index() {
    let harness = OrchestratorHarness::new();
    let orchestrator = harness.orchestrator();
    let input = harness.seed_dispatched_job("job-happy", video_bytes(90)).await;

    orchestrator.run(input).await.expect("pipeline succeeds");

    let job = harness
        .jobs
        .get("job-happy")
        .await
        .expect("get")
        .expect("job exists");
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.progress, 1.0);
    assert!(job.result_key.is_some());
    assert!(job.failure_report_key.is_none());
    assert!(job.timings.contains_key("download"));
    assert!(job.timings.contains_key("asr"));
    assert!(job.timings.contains_key("upload"));

    let summary = fetch_summary(&harness, "job-happy").await;
    assert!(!summary.time_blocks.is_empty());
    assert_eq!(summary.video_id, "job-happy");

    // Markdown artifact sits next to the JSON.
    harness
        .blob
        .get("results/job-happy/summary.md")
        .await
        .expect("summary.md must exist");

    // Indexing ran: at least the summary_block chunk landed.
    assert!(harness.vector_store.count().await.expect("count") >= 1);
}

#[tokio::test]
async fn short_video_produces_exactly_one_time_block() {
    let harness = OrchestratorHarness::new();
    let orchestrator = harness.orchestrator();
    let input = harness.seed_dispatched_job("job-short", video_bytes(10)).await;

    orchestrator.run(input).await.expect("pipeline succeeds");

    let summary = fetch_summary(&harness, "job-short").await;
    assert_eq!(summary.time_blocks.len(), 1);
}

#[tokio::test]
async fn silent_video_completes_with_default_blocks() {
    let harness = OrchestratorHarness::new();
    let orchestrator = harness.orchestrator();
    let input = harness
        .seed_dispatched_job("job-silent", silent_video_bytes(30))
        .await;

    orchestrator.run(input).await.expect("pipeline succeeds");

    let job = harness
        .jobs
        .get("job-silent")
        .await
        .expect("get")
        .expect("job exists");
    assert_eq!(job.state, JobState::Completed);

    let summary = fetch_summary(&harness, "job-silent").await;
    assert!(!summary.time_blocks.is_empty());
    let block = &summary.time_blocks[0];
    assert_eq!(block.activity, "No speech detected");
    assert!(block.participants.is_empty());

    // Indexing still ran over the default blocks.
    assert!(harness.vector_store.count().await.expect("count") >= 1);
}

#[tokio::test]
async fn fatal_asr_fails_the_job_with_a_report() {
    let harness = OrchestratorHarness::new();
    let orchestrator = harness.orchestrator_with(
        Arc::new(lifestream_providers::models::MockDiarizer),
        Arc::new(FailingAsrEngine),
    );
    let input = harness.seed_dispatched_job("job-asr", video_bytes(30)).await;

    orchestrator.run(input).await.expect_err("pipeline must fail");

    let job = harness
        .jobs
        .get("job-asr")
        .await
        .expect("get")
        .expect("job exists");
    assert_eq!(job.state, JobState::Failed);
    assert!(job.result_key.is_none());
    let report_key = job.failure_report_key.expect("failure report key set");
    assert_eq!(report_key, "results/job-asr/failure_report.json");
    assert!(job.error_summary.is_some());

    let report_bytes = harness.blob.get(&report_key).await.expect("report exists");
    let report: lifestream_domain::entities::FailureReport =
        serde_json::from_slice(&report_bytes).expect("report parses");
    assert_eq!(report.stage, PipelineStage::Asr);
    assert_eq!(report.job_id, "job-asr");
    // Stages that completed before the fault carry their timings.
    assert!(report.partial_timings.contains_key("download"));
}

#[tokio::test]
async fn diarization_failure_degrades_to_single_speaker() {
    let harness = OrchestratorHarness::new();
    let orchestrator =
        harness.orchestrator_with(Arc::new(FailingDiarizer), Arc::new(MockAsrEngine::new()));
    let input = harness
        .seed_dispatched_job("job-degraded", video_bytes(30))
        .await;

    orchestrator.run(input).await.expect("pipeline succeeds");

    let job = harness
        .jobs
        .get("job-degraded")
        .await
        .expect("get")
        .expect("job exists");
    assert_eq!(job.state, JobState::Completed);

    let summary = fetch_summary(&harness, "job-degraded").await;
    let speakers = summary.speaker_ids();
    assert_eq!(speakers, vec!["Speaker_01".to_owned()]);
}

#[tokio::test]
async fn reindexing_the_same_summary_is_idempotent() {
    let harness = OrchestratorHarness::new();
    let orchestrator = harness.orchestrator();
    let input = harness.seed_dispatched_job("job-idem", video_bytes(45)).await;

    orchestrator.run(input).await.expect("pipeline succeeds");
    let first_count = harness.vector_store.count().await.expect("count");

    // Re-running the indexer over the persisted summary must overwrite in
    // place, not grow the index.
    let summary = fetch_summary(&harness, "job-idem").await;
    let indexer = lifestream_application::use_cases::MemoryIndexer::new(
        Arc::new(lifestream_providers::models::MockEmbeddingProvider::new(64)),
        harness.vector_store.clone(),
        lifestream_application::settings::IndexerSettings::default(),
    );
    indexer.index_summary(&summary).await.expect("reindex");
    assert_eq!(harness.vector_store.count().await.expect("count"), first_count);
}
