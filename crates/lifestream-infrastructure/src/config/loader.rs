//! Configuration loader — YAML-based.
//!
//! Loads [`AppConfig`] from YAML configuration files. Application settings
//! live under the `settings:` key in `config/{env}.yaml`.
//!
//! Environment is resolved from `LIFESTREAM_ENV` (default: `development`).

use std::env;
use std::path::{Path, PathBuf};

use tracing::info;

use lifestream_domain::error::{Error, Result};

use super::types::AppConfig;

/// Configuration loader service
///
/// Reads YAML config files and extracts the `settings:` section as
/// [`AppConfig`], validating fail-fast before anything is wired.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    /// Optional explicit config file path (overrides environment resolution)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    #[must_use]
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set an explicit configuration file path (overrides env-based resolution)
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from YAML.
    ///
    /// Resolution order:
    /// 1. Explicit path (via `with_config_path`)
    /// 2. `config/{env}.local.yaml` (highest priority override)
    /// 3. `config/{env}.yaml` (standard config)
    ///
    /// A missing config file is not an error when no explicit path was
    /// given: defaults apply, which is how tests and first runs work.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, parsing fails, or
    /// validation detects invalid values.
    pub fn load(&self) -> Result<AppConfig> {
        let config = match self.find_yaml_config_path()? {
            Some(yaml_path) => {
                info!(path = %yaml_path.display(), "Configuration loaded");
                let content = std::fs::read_to_string(&yaml_path)
                    .map_err(|e| Error::io_with_source("failed to read config file", e))?;
                let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                    .map_err(|e| Error::config(format!("failed to parse YAML config: {e}")))?;
                let settings = yaml.get("settings").ok_or_else(|| {
                    Error::ConfigMissing(
                        "no 'settings' key found in YAML configuration file".to_owned(),
                    )
                })?;
                serde_yaml::from_value(settings.clone())
                    .map_err(|e| Error::config(format!("invalid settings section: {e}")))?
            }
            None => {
                info!("No configuration file found; using defaults");
                AppConfig::default()
            }
        };

        validate_app_config(&config)?;
        Ok(config)
    }

    /// Find the YAML config file.
    ///
    /// Resolution: explicit `config_path` if set, else
    /// `config/{env}.local.yaml` then `config/{env}.yaml` searched from the
    /// current directory upward.
    fn find_yaml_config_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Ok(Some(path.clone()));
            }
            return Err(Error::ConfigMissing(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let env_name = env::var("LIFESTREAM_ENV").unwrap_or_else(|_| "development".to_owned());
        let filenames = [format!("{env_name}.local.yaml"), format!("{env_name}.yaml")];

        if let Ok(current_dir) = env::current_dir() {
            for dir in current_dir.ancestors() {
                for filename in &filenames {
                    let candidate = dir.join("config").join(filename);
                    if candidate.exists() {
                        return Ok(Some(candidate));
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Validate application configuration
///
/// Performs validation of all configuration sections, fail-fast.
fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_storage_config(config)?;
    validate_dispatcher_config(config)?;
    validate_pipeline_config(config)?;
    validate_indexing_config(config)?;
    validate_search_config(config)?;
    Ok(())
}

fn validate_storage_config(config: &AppConfig) -> Result<()> {
    if config.storage.max_upload_bytes == 0 {
        return Err(Error::ConfigInvalid {
            key: "storage.max_upload_bytes".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if config.storage.upload_url_ttl_seconds == 0 {
        return Err(Error::ConfigInvalid {
            key: "storage.upload_url_ttl_seconds".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    Ok(())
}

fn validate_dispatcher_config(config: &AppConfig) -> Result<()> {
    if config.dispatcher.max_concurrent_tasks == 0 {
        return Err(Error::ConfigInvalid {
            key: "dispatcher.max_concurrent_tasks".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if config.dispatcher.queue_visibility_seconds == 0 {
        return Err(Error::ConfigInvalid {
            key: "dispatcher.queue_visibility_seconds".to_owned(),
            message: "must exceed the worst-case launch latency".to_owned(),
        });
    }
    if config.dispatcher.max_receive_count == 0 {
        return Err(Error::ConfigInvalid {
            key: "dispatcher.max_receive_count".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    Ok(())
}

fn validate_pipeline_config(config: &AppConfig) -> Result<()> {
    if config.pipeline.chunk_window_seconds <= 0.0 {
        return Err(Error::ConfigInvalid {
            key: "pipeline.chunk_window_seconds".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if config.pipeline.parallel_max_workers == 0 {
        return Err(Error::ConfigInvalid {
            key: "pipeline.parallel_max_workers".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if config.pipeline.task_hard_timeout_seconds == 0 {
        return Err(Error::ConfigInvalid {
            key: "pipeline.task_hard_timeout_seconds".to_owned(),
            message: "must exceed the pipeline's worst case".to_owned(),
        });
    }
    for (stage, seconds) in &config.pipeline.stage_timeout_seconds {
        if *seconds == 0 {
            return Err(Error::ConfigInvalid {
                key: format!("pipeline.stage_timeout_seconds.{stage}"),
                message: "must be positive".to_owned(),
            });
        }
    }
    Ok(())
}

fn validate_indexing_config(config: &AppConfig) -> Result<()> {
    if config.indexing.embedding_batch_size == 0 {
        return Err(Error::ConfigInvalid {
            key: "indexing.embedding_batch_size".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if config.indexing.embedding_dimensions == 0 {
        return Err(Error::ConfigInvalid {
            key: "indexing.embedding_dimensions".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    Ok(())
}

fn validate_search_config(config: &AppConfig) -> Result<()> {
    if config.search.default_top_k == 0 || config.search.default_top_k > 50 {
        return Err(Error::ConfigInvalid {
            key: "search.default_top_k".to_owned(),
            message: "must be between 1 and 50".to_owned(),
        });
    }
    Ok(())
}
