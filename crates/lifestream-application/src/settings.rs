//! Per-service settings structs.
//!
//! The infrastructure layer maps the loaded configuration onto these;
//! defaults match the recognized config surface.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use lifestream_domain::constants::{
    DEFAULT_CHUNK_WINDOW_SECONDS, DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_PARALLEL_MAX_WORKERS,
    DEFAULT_SCENE_DETECTION_FRAME_SKIP, DEFAULT_STAGE_TIMEOUT_SECONDS, DEFAULT_TOP_K,
    EMBEDDING_RETRY_BACKOFF_MS, EMBEDDING_RETRY_COUNT, TRANSCRIPT_CHUNK_THRESHOLD_CHARS,
};
use lifestream_domain::entities::PipelineStage;

/// Settings for the upload handshake.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Lifetime of presigned PUT URLs
    pub upload_url_ttl: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
            upload_url_ttl: Duration::from_secs(15 * 60),
        }
    }
}

/// Settings for the dispatcher loop.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Maximum concurrent in-flight task launches
    pub max_concurrent_tasks: usize,
    /// Queue visibility timeout; must exceed worst-case launch latency
    pub queue_visibility: Duration,
    /// Sleep between polls when the queue is idle
    pub idle_backoff: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 10,
            queue_visibility: Duration::from_secs(120),
            idle_backoff: Duration::from_millis(250),
        }
    }
}

/// Settings for the processing pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Synchronization window in seconds
    pub chunk_window_seconds: f64,
    /// Frame skip passed to the scene detector
    pub scene_detection_frame_skip: u32,
    /// Worker pool size for the within-task branches
    pub parallel_max_workers: usize,
    /// Per-stage soft timeouts (stage wire name → seconds); stages absent
    /// from the map use the default
    pub stage_timeout_seconds: HashMap<String, u64>,
    /// Soft timeout for stages not listed in `stage_timeout_seconds`
    pub default_stage_timeout_seconds: u64,
    /// Directory the task downloads and works under
    pub work_dir: PathBuf,
    /// Path of the speaker registry YAML
    pub speaker_registry_path: PathBuf,
}

impl PipelineSettings {
    /// Soft timeout for one stage.
    pub fn stage_timeout(&self, stage: PipelineStage) -> Duration {
        let seconds = self
            .stage_timeout_seconds
            .get(stage.as_str())
            .copied()
            .unwrap_or(self.default_stage_timeout_seconds);
        Duration::from_secs(seconds)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_window_seconds: DEFAULT_CHUNK_WINDOW_SECONDS,
            scene_detection_frame_skip: DEFAULT_SCENE_DETECTION_FRAME_SKIP,
            parallel_max_workers: DEFAULT_PARALLEL_MAX_WORKERS,
            stage_timeout_seconds: HashMap::new(),
            default_stage_timeout_seconds: DEFAULT_STAGE_TIMEOUT_SECONDS,
            work_dir: std::env::temp_dir().join("lifestream-work"),
            speaker_registry_path: PathBuf::from("config/speakers.yaml"),
        }
    }
}

/// Settings for the memory indexer.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    /// Texts per embedding API call
    pub embedding_batch_size: usize,
    /// Attempts per batch before giving up on it
    pub retry_count: usize,
    /// Exponential backoff base in milliseconds
    pub retry_backoff_ms: u64,
    /// Transcript length above which blocks split into transcript chunks
    pub transcript_chunk_chars: usize,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            retry_count: EMBEDDING_RETRY_COUNT,
            retry_backoff_ms: EMBEDDING_RETRY_BACKOFF_MS,
            transcript_chunk_chars: TRANSCRIPT_CHUNK_THRESHOLD_CHARS,
        }
    }
}

/// Settings for the search service.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// `top_k` used when the caller omits it
    pub default_top_k: usize,
    /// Whether answer synthesis runs when a synthesizer is wired
    pub synthesis_enabled: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            synthesis_enabled: true,
        }
    }
}
