//! Composition root.
//!
//! Builds every provider once from the loaded configuration, wires them
//! into the application services, and hands the result to the server and
//! the dispatcher loop. Providers are chosen at startup; there is no
//! runtime switching.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use lifestream_application::settings::{
    DispatcherSettings, IndexerSettings, PipelineSettings, SearchSettings, UploadSettings,
};
use lifestream_application::use_cases::{
    Dispatcher, MemoryIndexer, Orchestrator, SearchService, UploadService,
};
use lifestream_domain::error::Result;
use lifestream_domain::ports::{
    AnswerSynthesizer, EmbeddingProvider, JobTable, Queue, SecretsProvider, Summarizer,
    TaskLauncher, VectorStore,
};
use lifestream_providers::blob::LocalBlobStore;
use lifestream_providers::launcher::LocalTaskLauncher;
use lifestream_providers::models::{
    MockAnswerSynthesizer, MockAsrEngine, MockDiarizer, MockEmbeddingProvider,
    MockKeyframeExtractor, MockMediaProbe, MockMeetingClassifier, MockSceneDetector,
    MockSummarizer, OpenAiChatBackend, OpenAiEmbeddings, OpenAiSummarizer, OpenAiSynthesizer,
};
use lifestream_providers::queue::InMemoryQueue;
use lifestream_providers::secrets::EnvSecrets;
use lifestream_providers::tables::{InMemoryIdempotencyTable, InMemoryJobTable};
use lifestream_providers::vector::InMemoryVectorStore;

use crate::config::{AppConfig, ModelBackendKind};

/// Everything the binary needs to serve traffic.
pub struct AppContext {
    /// The loaded configuration
    pub config: AppConfig,
    /// API-facing upload operations
    pub upload_service: Arc<UploadService>,
    /// The query path
    pub search_service: Arc<SearchService>,
    /// The queue consumer loop
    pub dispatcher: Dispatcher,
    /// Provider names by concern, surfaced on the health endpoint
    pub provider_names: HashMap<String, String>,
}

impl AppContext {
    /// Wire the full application from configuration.
    ///
    /// # Errors
    /// Returns an error when a provider cannot be constructed (e.g. the
    /// blob root is not writable).
    pub async fn build(config: AppConfig) -> Result<Self> {
        let blob = Arc::new(LocalBlobStore::new(&config.storage.blob_root)?);
        let queue: Arc<dyn Queue> =
            Arc::new(InMemoryQueue::new(config.dispatcher.max_receive_count));
        let jobs: Arc<dyn JobTable> = Arc::new(InMemoryJobTable::new());
        let idempotency = Arc::new(InMemoryIdempotencyTable::new());
        let vector_store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let secrets = EnvSecrets::new();

        let (embedder, summarizer, synthesizer) = build_model_backends(&config, &secrets).await;

        let indexer = Arc::new(MemoryIndexer::new(
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
            IndexerSettings {
                embedding_batch_size: config.indexing.embedding_batch_size,
                retry_count: config.indexing.retry_count,
                retry_backoff_ms: config.indexing.retry_backoff_ms,
                transcript_chunk_chars: config.indexing.transcript_chunk_chars,
            },
        ));

        let asr = if config.pipeline.use_faster_asr {
            Arc::new(MockAsrEngine::faster())
        } else {
            Arc::new(MockAsrEngine::new())
        };
        let orchestrator = Arc::new(Orchestrator::new(
            blob.clone(),
            Arc::clone(&jobs),
            Arc::new(MockMediaProbe),
            Arc::new(MockDiarizer),
            asr,
            Arc::new(MockSceneDetector),
            Arc::new(MockKeyframeExtractor),
            Arc::new(MockMeetingClassifier),
            summarizer,
            indexer,
            PipelineSettings {
                chunk_window_seconds: config.pipeline.chunk_window_seconds,
                scene_detection_frame_skip: config.pipeline.scene_detection_frame_skip,
                parallel_max_workers: config.pipeline.parallel_max_workers,
                stage_timeout_seconds: config.pipeline.stage_timeout_seconds.clone(),
                default_stage_timeout_seconds: config.pipeline.default_stage_timeout_seconds,
                work_dir: config.pipeline.work_dir.clone(),
                speaker_registry_path: config.speakers.registry_path.clone(),
            },
        ));
        let launcher: Arc<dyn TaskLauncher> = Arc::new(
            LocalTaskLauncher::new(orchestrator).with_hard_timeout(Duration::from_secs(
                config.pipeline.task_hard_timeout_seconds,
            )),
        );

        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&jobs),
            idempotency.clone(),
            Arc::clone(&launcher),
            DispatcherSettings {
                max_concurrent_tasks: config.dispatcher.max_concurrent_tasks,
                queue_visibility: Duration::from_secs(config.dispatcher.queue_visibility_seconds),
                ..DispatcherSettings::default()
            },
        );

        let upload_service = Arc::new(UploadService::new(
            blob.clone(),
            Arc::clone(&jobs),
            idempotency,
            Arc::clone(&queue),
            UploadSettings {
                max_upload_bytes: config.storage.max_upload_bytes,
                upload_url_ttl: Duration::from_secs(config.storage.upload_url_ttl_seconds),
            },
        ));

        let search_service = Arc::new(SearchService::new(
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
            synthesizer,
            SearchSettings {
                default_top_k: config.search.default_top_k,
                synthesis_enabled: config.search.synthesis_enabled,
            },
        ));

        let mut provider_names = HashMap::new();
        provider_names.insert("blob_store".to_owned(), "local-fs".to_owned());
        provider_names.insert("queue".to_owned(), queue.provider_name().to_owned());
        provider_names.insert("job_table".to_owned(), jobs.provider_name().to_owned());
        provider_names.insert(
            "vector_store".to_owned(),
            vector_store.provider_name().to_owned(),
        );
        provider_names.insert("launcher".to_owned(), launcher.provider_name().to_owned());
        provider_names.insert("embeddings".to_owned(), embedder.provider_name().to_owned());

        info!(
            backends = ?provider_names,
            "Application context built"
        );

        Ok(Self {
            config,
            upload_service,
            search_service,
            dispatcher,
            provider_names,
        })
    }
}

/// Choose the embedding, summarizer, and synthesizer backends.
///
/// The diarizer, ASR, scene, and keyframe components always use the
/// offline backends here; their production counterparts run inside the
/// container image and are wired the same way.
async fn build_model_backends(
    config: &AppConfig,
    secrets: &EnvSecrets,
) -> (
    Arc<dyn EmbeddingProvider>,
    Arc<dyn Summarizer>,
    Option<Arc<dyn AnswerSynthesizer>>,
) {
    match config.providers.models {
        ModelBackendKind::Mock => (
            Arc::new(MockEmbeddingProvider::new(
                config.indexing.embedding_dimensions,
            )),
            Arc::new(MockSummarizer),
            Some(Arc::new(MockAnswerSynthesizer)),
        ),
        ModelBackendKind::Openai => {
            let embedding_key = read_secret(secrets, "embedding-api-key").await;
            let summarizer_key = read_secret(secrets, "summarizer-api-key").await;
            let (Some(embedding_key), Some(summarizer_key)) = (embedding_key, summarizer_key)
            else {
                warn!(
                    "OpenAI backends configured but API keys are unset; falling back to mock backends"
                );
                return (
                    Arc::new(MockEmbeddingProvider::new(
                        config.indexing.embedding_dimensions,
                    )),
                    Arc::new(MockSummarizer),
                    Some(Arc::new(MockAnswerSynthesizer)),
                );
            };
            let embedder = Arc::new(OpenAiEmbeddings::new(
                &config.providers.api_base,
                &config.providers.embedding_model,
                embedding_key,
                config.indexing.embedding_dimensions,
            ));
            let summarizer = Arc::new(OpenAiSummarizer::new(OpenAiChatBackend::new(
                &config.providers.api_base,
                &config.providers.chat_model,
                summarizer_key.clone(),
            )));
            let synthesizer = Arc::new(OpenAiSynthesizer::new(OpenAiChatBackend::new(
                &config.providers.api_base,
                &config.providers.chat_model,
                summarizer_key,
            )));
            (embedder, summarizer, Some(synthesizer))
        }
    }
}

async fn read_secret(secrets: &EnvSecrets, name: &str) -> Option<String> {
    match secrets.get(name).await {
        Ok(value) => value,
        Err(e) => {
            warn!(secret = name, error = %e, "Secret lookup failed");
            None
        }
    }
}
