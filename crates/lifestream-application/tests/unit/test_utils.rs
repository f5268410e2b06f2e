//! Shared test utilities and mocks for lifestream-application tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use lifestream_application::settings::{IndexerSettings, PipelineSettings};
use lifestream_application::use_cases::{MemoryIndexer, Orchestrator};
use lifestream_domain::entities::{AudioSegment, SynchronizedContext};
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{
    AnswerSynthesizer, AsrEngine, BlobStore, Diarizer, EmbeddingProvider, JobTable, TaskLauncher,
    VectorStore,
};
use lifestream_domain::value_objects::{
    MetadataFilter, SearchResult, SpeakerTurn, TaskInput, VectorRecord, Waveform,
};
use lifestream_providers::blob::LocalBlobStore;
use lifestream_providers::models::{
    MockAsrEngine, MockDiarizer, MockEmbeddingProvider, MockKeyframeExtractor, MockMediaProbe,
    MockMeetingClassifier, MockSceneDetector, MockSummarizer,
};
use lifestream_providers::tables::InMemoryJobTable;
use lifestream_providers::vector::InMemoryVectorStore;

/// Bytes per second of mock video content (mirrors the mock probe).
pub const MOCK_BYTES_PER_SECOND: usize = 160_000;

/// Non-silent video bytes of roughly `seconds` duration.
pub fn video_bytes(seconds: usize) -> Vec<u8> {
    (0..seconds * MOCK_BYTES_PER_SECOND)
        .map(|i| (i % 251) as u8 + 1)
        .collect()
}

/// All-zero bytes read as silent by the mock probe.
pub fn silent_video_bytes(seconds: usize) -> Vec<u8> {
    vec![0u8; seconds * MOCK_BYTES_PER_SECOND]
}

/// ASR backend that always errors (drives the fatal-ASR scenario).
pub struct FailingAsrEngine;

#[async_trait]
impl AsrEngine for FailingAsrEngine {
    async fn transcribe(
        &self,
        _waveform: &Waveform,
        _turns: &[SpeakerTurn],
    ) -> Result<Vec<AudioSegment>> {
        Err(Error::model("asr", "backend rejected the waveform"))
    }

    fn provider_name(&self) -> &str {
        "failing-asr"
    }
}

/// Diarizer that always errors (drives the degradation path).
pub struct FailingDiarizer;

#[async_trait]
impl Diarizer for FailingDiarizer {
    async fn diarize(&self, _waveform: &Waveform) -> Result<Vec<SpeakerTurn>> {
        Err(Error::model("diarizer", "model weights unavailable"))
    }

    fn provider_name(&self) -> &str {
        "failing-diarizer"
    }
}

/// Embedding backend that fails the first `failures` calls, then delegates
/// to the mock backend.
pub struct FlakyEmbeddingProvider {
    inner: MockEmbeddingProvider,
    remaining_failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyEmbeddingProvider {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MockEmbeddingProvider::new(64),
            remaining_failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::embedding("simulated transient 5xx"));
        }
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn provider_name(&self) -> &str {
        "flaky-embeddings"
    }
}

/// Vector store whose every call fails (drives `service_unavailable`).
pub struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn upsert(&self, _records: Vec<VectorRecord>) -> Result<()> {
        Err(Error::vector_store("connection refused"))
    }

    async fn search(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        Err(Error::vector_store("connection refused"))
    }

    async fn delete(&self, _ids: &[String]) -> Result<()> {
        Err(Error::vector_store("connection refused"))
    }

    async fn count(&self) -> Result<usize> {
        Err(Error::vector_store("connection refused"))
    }

    fn provider_name(&self) -> &str {
        "failing-vector-store"
    }
}

/// Synthesizer that always errors (query must degrade, not fail).
pub struct FailingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _query: &str, _contexts: &[String]) -> Result<String> {
        Err(Error::model("synthesizer", "context window exceeded"))
    }

    fn provider_name(&self) -> &str {
        "failing-synthesizer"
    }
}

/// Launcher that records launches and tracks peak concurrency.
pub struct CountingLauncher {
    launches: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    hold: Duration,
}

impl CountingLauncher {
    pub fn new() -> Self {
        Self::holding(Duration::ZERO)
    }

    /// Hold each launch call open for `hold`, making overlap observable.
    pub fn holding(hold: Duration) -> Self {
        Self {
            launches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            hold,
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskLauncher for CountingLauncher {
    async fn launch(&self, input: TaskInput) -> Result<String> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("task-{}", input.job_id))
    }

    fn provider_name(&self) -> &str {
        "counting"
    }
}

/// Fully mocked orchestrator over a temp blob store and in-memory tables.
pub struct OrchestratorHarness {
    pub blob: Arc<LocalBlobStore>,
    pub jobs: Arc<InMemoryJobTable>,
    pub vector_store: Arc<InMemoryVectorStore>,
    pub work_dir: tempfile::TempDir,
    pub blob_dir: tempfile::TempDir,
}

impl OrchestratorHarness {
    pub fn new() -> Self {
        let blob_dir = tempfile::tempdir().expect("blob tempdir");
        let work_dir = tempfile::tempdir().expect("work tempdir");
        Self {
            blob: Arc::new(LocalBlobStore::new(blob_dir.path()).expect("blob store")),
            jobs: Arc::new(InMemoryJobTable::new()),
            vector_store: Arc::new(InMemoryVectorStore::new()),
            work_dir,
            blob_dir,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            work_dir: self.work_dir.path().to_path_buf(),
            speaker_registry_path: self.blob_dir.path().join("speakers.yaml"),
            ..PipelineSettings::default()
        }
    }

    fn indexer(&self) -> Arc<MemoryIndexer> {
        Arc::new(MemoryIndexer::new(
            Arc::new(MockEmbeddingProvider::new(64)),
            self.vector_store.clone(),
            IndexerSettings::default(),
        ))
    }

    /// Orchestrator with the full mock model set.
    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator_with(Arc::new(MockDiarizer), Arc::new(MockAsrEngine::new()))
    }

    /// Orchestrator with custom audio backends (for failure injection).
    pub fn orchestrator_with(
        &self,
        diarizer: Arc<dyn Diarizer>,
        asr: Arc<dyn AsrEngine>,
    ) -> Orchestrator {
        Orchestrator::new(
            self.blob.clone(),
            self.jobs.clone(),
            Arc::new(MockMediaProbe),
            diarizer,
            asr,
            Arc::new(MockSceneDetector),
            Arc::new(MockKeyframeExtractor),
            Arc::new(MockMeetingClassifier),
            Arc::new(MockSummarizer),
            self.indexer(),
            self.pipeline_settings(),
        )
    }

    /// Seed a job row in `dispatched` state with its video in the blob
    /// store, returning the task input the launcher would pass.
    pub async fn seed_dispatched_job(&self, job_id: &str, video: Vec<u8>) -> TaskInput {
        let object_key = format!("uploads/{job_id}/day.mp4");
        self.blob
            .put(&object_key, video, "video/mp4")
            .await
            .expect("seed blob");
        let info = self.blob.head(&object_key).await.expect("head");

        let job = lifestream_domain::entities::Job::new(
            job_id,
            &object_key,
            &info.content_hash,
            None,
        );
        self.jobs.create(job).await.expect("create job");
        self.jobs
            .transition(
                job_id,
                lifestream_domain::entities::JobState::Queued,
                lifestream_domain::entities::JobState::Dispatched,
                lifestream_domain::ports::JobMutation::default(),
            )
            .await
            .expect("dispatch job");

        TaskInput {
            job_id: job_id.to_owned(),
            object_key,
            object_version: info.content_hash,
            client_duration_hint: None,
        }
    }
}
