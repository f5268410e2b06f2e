//! OpenAI-style HTTP model backends.
//!
//! Any endpoint speaking the `/embeddings` and `/chat/completions` wire
//! shapes works; the base URL, model names, and API keys come from config
//! and the secrets provider at wiring time.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use lifestream_domain::entities::SynchronizedContext;
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{AnswerSynthesizer, BlockSummary, EmbeddingProvider, Summarizer};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared HTTP plumbing for the chat-completion backends.
pub struct OpenAiChatBackend {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl OpenAiChatBackend {
    /// Create a backend against `api_base` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct Message {
            content: String,
        }
        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
            }))
            .send()
            .await
            .map_err(|e| Error::model(&self.model, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model(
                &self.model,
                format!("HTTP {status}: {}", truncate(&body, 300)),
            ));
        }
        let parsed: Response = response
            .json()
            .await
            .map_err(|e| Error::model(&self.model, format!("malformed response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::model(&self.model, "response contained no choices"))
    }
}

/// Embedding backend speaking the `/embeddings` wire shape.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    /// Create a backend emitting vectors of `dimensions`.
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            api_key: api_key.into(),
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Deserialize)]
        struct Item {
            embedding: Vec<f32>,
        }
        #[derive(Deserialize)]
        struct Response {
            data: Vec<Item>,
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "model": self.model, "input": texts }))
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "HTTP {status}: {}",
                truncate(&body, 300)
            )));
        }
        let parsed: Response = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("malformed response: {e}")))?;
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "openai-embeddings"
    }
}

/// Summarizer backed by a chat-completion model returning structured JSON.
pub struct OpenAiSummarizer {
    backend: OpenAiChatBackend,
}

impl OpenAiSummarizer {
    /// Wrap a chat backend.
    pub fn new(backend: OpenAiChatBackend) -> Self {
        Self { backend }
    }
}

const SUMMARIZER_SYSTEM_PROMPT: &str = "You summarize first-person daily footage. \
Respond with a single JSON object with the fields: activity, location, participants \
(array of speaker ids), transcript_summary, action_items (array of strings), \
source_reliability (high|medium|low), context_type (meeting|vlog|unknown). \
Respond with JSON only, no prose.";

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, context: &SynchronizedContext) -> Result<BlockSummary> {
        let user = format!(
            "Window {:.0}s-{:.0}s.\nTranscript (speaker-labeled):\n{}\n\nVisual context: {} keyframes captured in this window.",
            context.start_seconds,
            context.end_seconds,
            context.labeled_transcript(),
            context.keyframes.len(),
        );
        let content = self.backend.complete(SUMMARIZER_SYSTEM_PROMPT, &user).await?;
        let stripped = strip_code_fences(&content);
        serde_json::from_str(stripped).map_err(|e| {
            Error::model(
                &self.backend.model,
                format!("summarizer returned malformed JSON: {e}"),
            )
        })
    }

    fn provider_name(&self) -> &str {
        "openai-summarizer"
    }
}

/// Answer synthesizer backed by a chat-completion model.
pub struct OpenAiSynthesizer {
    backend: OpenAiChatBackend,
}

impl OpenAiSynthesizer {
    /// Wrap a chat backend.
    pub fn new(backend: OpenAiChatBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AnswerSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, query: &str, contexts: &[String]) -> Result<String> {
        let user = format!(
            "Question: {query}\n\nRelevant moments from the user's footage:\n{}",
            contexts
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}. {c}", i + 1))
                .collect::<Vec<_>>()
                .join("\n")
        );
        self.backend
            .complete(
                "Answer the question using only the provided moments. Be concise.",
                &user,
            )
            .await
    }

    fn provider_name(&self) -> &str {
        "openai-synthesizer"
    }
}

fn truncate(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}
