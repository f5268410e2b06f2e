//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the LifeStream service core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided by a caller
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Request conflicts with the current state of a resource
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// Blob store operation error
    #[error("Blob store error: {message}")]
    Blob {
        /// Description of the blob store error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Work queue operation error
    #[error("Queue error: {message}")]
    Queue {
        /// Description of the queue error
        message: String,
    },

    /// Job or idempotency table operation error
    #[error("Table error: {message}")]
    Table {
        /// Description of the table error
        message: String,
    },

    /// A state transition the job state machine forbids
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// State the job was in
        from: String,
        /// State the caller asked for
        to: String,
    },

    /// Container task launch error
    #[error("Task launch error: {message}")]
    Launch {
        /// Description of the launch error
        message: String,
    },

    /// Vector store operation error
    #[error("Vector store error: {message}")]
    VectorStore {
        /// Description of the vector store error
        message: String,
    },

    /// Embedding backend operation error
    #[error("Embedding error: {message}")]
    Embedding {
        /// Description of the embedding error
        message: String,
    },

    /// An ML model component returned an error or malformed output
    #[error("Model '{model}' failed: {message}")]
    Model {
        /// Which model component failed (diarizer, asr, summarizer, ...)
        model: String,
        /// Description of the failure
        message: String,
    },

    /// A pipeline stage exceeded its soft timeout
    #[error("Stage '{stage}' timed out after {seconds} s")]
    StageTimeout {
        /// Stage that breached its budget
        stage: String,
        /// Configured timeout in seconds
        seconds: u64,
    },

    /// Corrupt or unreadable media input
    #[error("Media error: {message}")]
    Media {
        /// Description of the media fault
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Missing configuration field
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// Invalid configuration value
    #[error("Invalid configuration for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key that is invalid
        key: String,
        /// Reason why it is invalid
        message: String,
    },

    /// A downstream dependency is unreachable after retries
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Description of the unavailable dependency
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Storage and queue error creation methods
impl Error {
    /// Create a blob store error
    pub fn blob<S: Into<String>>(message: S) -> Self {
        Self::Blob {
            message: message.into(),
            source: None,
        }
    }

    /// Create a blob store error with source
    pub fn blob_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Blob {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a queue error
    pub fn queue<S: Into<String>>(message: S) -> Self {
        Self::Queue {
            message: message.into(),
        }
    }

    /// Create a table error
    pub fn table<S: Into<String>>(message: S) -> Self {
        Self::Table {
            message: message.into(),
        }
    }

    /// Create a task launch error
    pub fn launch<S: Into<String>>(message: S) -> Self {
        Self::Launch {
            message: message.into(),
        }
    }
}

// Indexing and model error creation methods
impl Error {
    /// Create a vector store error
    pub fn vector_store<S: Into<String>>(message: S) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a model failure error
    pub fn model<M: Into<String>, S: Into<String>>(model: M, message: S) -> Self {
        Self::Model {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a media fault error
    pub fn media<S: Into<String>>(message: S) -> Self {
        Self::Media {
            message: message.into(),
        }
    }

    /// Create a service unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl Error {
    /// Short machine-readable class name, used in failure reports.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
            Self::NotFound { .. } => "not_found",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Conflict { .. } => "conflict",
            Self::Blob { .. } => "blob",
            Self::Queue { .. } => "queue",
            Self::Table { .. } => "table",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Launch { .. } => "launch",
            Self::VectorStore { .. } => "vector_store",
            Self::Embedding { .. } => "embedding",
            Self::Model { .. } => "model",
            Self::StageTimeout { .. } => "stage_timeout",
            Self::Media { .. } => "media",
            Self::Config { .. } | Self::ConfigMissing(_) | Self::ConfigInvalid { .. } => "config",
            Self::Unavailable { .. } => "unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether retrying the same call may succeed (transient downstream fault).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Queue { .. } | Self::Embedding { .. }
        )
    }
}
