//! Environment-backed secrets provider.

use async_trait::async_trait;

use lifestream_domain::error::Result;
use lifestream_domain::ports::SecretsProvider;

/// Resolves secret names to environment variables.
///
/// Names are upper-cased with `-` mapped to `_` and prefixed, so
/// `embedding-api-key` reads `LIFESTREAM_EMBEDDING_API_KEY`.
pub struct EnvSecrets {
    prefix: String,
}

impl EnvSecrets {
    /// Create a provider with the standard `LIFESTREAM_` prefix.
    pub fn new() -> Self {
        Self {
            prefix: "LIFESTREAM_".to_owned(),
        }
    }

    /// Create a provider with a custom prefix (used by tests).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, name: &str) -> String {
        let suffix: String = name
            .chars()
            .map(|c| match c {
                '-' | '.' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl Default for EnvSecrets {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretsProvider for EnvSecrets {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var(self.var_name(name)).ok())
    }

    fn provider_name(&self) -> &str {
        "env"
    }
}
