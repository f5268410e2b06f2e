//! Configuration types and loading.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, DispatcherConfig, IndexingConfig, ModelBackendKind, PipelineConfig,
    ProvidersConfig, SearchConfig, ServerConfig, SpeakersConfig, StorageConfig,
};
