//! Indexing and embedding constants.

/// Default embedding batch size.
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// Default retry count for embedding API requests.
pub const EMBEDDING_RETRY_COUNT: usize = 3;

/// Default retry backoff base for embedding API requests (milliseconds).
pub const EMBEDDING_RETRY_BACKOFF_MS: u64 = 500;

/// Transcript length above which a time block is split into separate
/// `transcript_block` chunks.
pub const TRANSCRIPT_CHUNK_THRESHOLD_CHARS: usize = 2_000;
