//! Application configuration schema.
//!
//! Lives under the `settings:` key of `config/{env}.yaml`. Every field has
//! a serde default, so a minimal config file is valid.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Dispatcher settings
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Processing pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Indexing settings
    #[serde(default)]
    pub indexing: IndexingConfig,
    /// Query path settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Speaker registry settings
    #[serde(default)]
    pub speakers: SpeakersConfig,
    /// Model backend selection
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port (0 lets the OS pick, used in tests)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory of the local blob store
    #[serde(default = "default_blob_root")]
    pub blob_root: PathBuf,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Lifetime of presigned PUT URLs, seconds
    #[serde(default = "default_upload_url_ttl_seconds")]
    pub upload_url_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_root: default_blob_root(),
            max_upload_bytes: default_max_upload_bytes(),
            upload_url_ttl_seconds: default_upload_url_ttl_seconds(),
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Maximum concurrent in-flight task launches
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
    /// Queue visibility timeout in seconds; must exceed launch latency
    #[serde(default = "default_queue_visibility_seconds")]
    pub queue_visibility_seconds: u64,
    /// Deliveries before a message routes to the dead-letter queue
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            queue_visibility_seconds: default_queue_visibility_seconds(),
            max_receive_count: default_max_receive_count(),
        }
    }
}

/// Processing pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Synchronization window in seconds
    #[serde(default = "default_chunk_window_seconds")]
    pub chunk_window_seconds: f64,
    /// Worker pool size for the within-task branches
    #[serde(default = "default_parallel_max_workers")]
    pub parallel_max_workers: usize,
    /// Scene detection frame skip (speed vs. granularity)
    #[serde(default = "default_scene_detection_frame_skip")]
    pub scene_detection_frame_skip: u32,
    /// Select the faster ASR backend when available
    #[serde(default = "default_use_faster_asr")]
    pub use_faster_asr: bool,
    /// Per-stage soft timeouts, stage wire name → seconds
    #[serde(default)]
    pub stage_timeout_seconds: HashMap<String, u64>,
    /// Soft timeout for stages not listed above, seconds
    #[serde(default = "default_stage_timeout_seconds")]
    pub default_stage_timeout_seconds: u64,
    /// Hard wall-clock timeout for a whole task, seconds; must exceed the
    /// pipeline's worst case
    #[serde(default = "default_task_hard_timeout_seconds")]
    pub task_hard_timeout_seconds: u64,
    /// Directory tasks download and work under
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_window_seconds: default_chunk_window_seconds(),
            parallel_max_workers: default_parallel_max_workers(),
            scene_detection_frame_skip: default_scene_detection_frame_skip(),
            use_faster_asr: default_use_faster_asr(),
            stage_timeout_seconds: HashMap::new(),
            default_stage_timeout_seconds: default_stage_timeout_seconds(),
            task_hard_timeout_seconds: default_task_hard_timeout_seconds(),
            work_dir: default_work_dir(),
        }
    }
}

/// Indexing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexingConfig {
    /// Texts per embedding API call
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,
    /// Dimensionality of the embedding space
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Attempts per batch before dropping it
    #[serde(default = "default_retry_count")]
    pub retry_count: usize,
    /// Exponential backoff base, milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Transcript length above which blocks split into transcript chunks
    #[serde(default = "default_transcript_chunk_chars")]
    pub transcript_chunk_chars: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            embedding_batch_size: default_embedding_batch_size(),
            embedding_dimensions: default_embedding_dimensions(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            transcript_chunk_chars: default_transcript_chunk_chars(),
        }
    }
}

/// Query path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// `top_k` used when the caller omits it
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    /// Whether answer synthesis runs
    #[serde(default = "default_synthesis_enabled")]
    pub synthesis_enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            synthesis_enabled: default_synthesis_enabled(),
        }
    }
}

/// Speaker registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeakersConfig {
    /// Path of the registry YAML, read at every task start
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
}

impl Default for SpeakersConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
        }
    }
}

/// Which model backends to wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackendKind {
    /// Deterministic offline backends
    #[default]
    Mock,
    /// OpenAI-style HTTP backends for embeddings and LLM calls
    Openai,
}

/// Model backend selection and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Backend family for embeddings, summarization, and synthesis
    #[serde(default)]
    pub models: ModelBackendKind,
    /// Base URL of the OpenAI-style API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Chat model name for summarization and synthesis
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            models: ModelBackendKind::default(),
            api_base: default_api_base(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}
fn default_port() -> u16 {
    8080
}
fn default_blob_root() -> PathBuf {
    PathBuf::from("data/blobs")
}
fn default_max_upload_bytes() -> u64 {
    2 * 1024 * 1024 * 1024
}
fn default_upload_url_ttl_seconds() -> u64 {
    900
}
fn default_max_concurrent_tasks() -> usize {
    10
}
fn default_queue_visibility_seconds() -> u64 {
    120
}
fn default_max_receive_count() -> u32 {
    3
}
fn default_chunk_window_seconds() -> f64 {
    300.0
}
fn default_parallel_max_workers() -> usize {
    2
}
fn default_scene_detection_frame_skip() -> u32 {
    2
}
fn default_use_faster_asr() -> bool {
    true
}
fn default_stage_timeout_seconds() -> u64 {
    600
}
fn default_task_hard_timeout_seconds() -> u64 {
    7_200
}
fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("lifestream-work")
}
fn default_embedding_batch_size() -> usize {
    64
}
fn default_embedding_dimensions() -> usize {
    256
}
fn default_retry_count() -> usize {
    3
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_transcript_chunk_chars() -> usize {
    2_000
}
fn default_top_k() -> usize {
    10
}
fn default_synthesis_enabled() -> bool {
    true
}
fn default_registry_path() -> PathBuf {
    PathBuf::from("config/speakers.yaml")
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".to_owned()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_owned()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".to_owned()
}
