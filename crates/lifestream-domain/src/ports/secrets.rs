//! Secrets vault port.

use async_trait::async_trait;

use crate::error::Result;

/// Read-only access to named secrets, resolved at task start.
///
/// Names only pass through the core (embedding-API key, summarizer-API
/// key, diarizer-model token, vector-store key); values never appear in
/// config files or logs.
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Fetch a secret by name, `None` if unset.
    async fn get(&self, name: &str) -> Result<Option<String>>;

    /// Name of this provider (e.g. "env").
    fn provider_name(&self) -> &str;
}
