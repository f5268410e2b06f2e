//! Search Service Use Case
//!
//! # Overview
//! The `SearchService` answers natural-language questions against the
//! indexed memory: embed the query with the same backend used for
//! indexing, translate the caller's filters into the vector store's
//! dialect, retrieve top-k, cut below `min_score`, and optionally
//! synthesize a single answer from the retrieved chunks.
//!
//! Synthesis failures degrade to results-only; embedding and store
//! failures surface as `service_unavailable`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use lifestream_domain::constants::MAX_TOP_K;
use lifestream_domain::error::{Error, Result};
use lifestream_domain::ports::{AnswerSynthesizer, EmbeddingProvider, VectorStore};
use lifestream_domain::value_objects::{MetadataFilter, SearchFilters, SearchResult};

use crate::settings::SearchSettings;

/// A query against the indexed memory.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The natural-language question
    pub query: String,
    /// Number of results to retrieve (defaults from settings, capped at 50)
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Drop results scoring below this value
    #[serde(default)]
    pub min_score: Option<f32>,
    /// Metadata restrictions
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

/// The query response: raw hits plus an optional synthesized answer.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// The query as interpreted
    pub query: String,
    /// Retrieved chunks, highest score first
    pub results: Vec<SearchResult>,
    /// Synthesized answer, when synthesis ran and succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Number of results returned
    pub total_results: usize,
}

/// Implementation of the semantic-search + answer-synthesis endpoint.
pub struct SearchService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
    settings: SearchSettings,
}

impl SearchService {
    /// Create a new search service with injected dependencies
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            synthesizer,
            settings,
        }
    }

    /// Run one query end to end.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an empty query or an
    /// out-of-range `top_k`, and [`Error::Unavailable`] when the embedding
    /// backend or vector store is unreachable.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let query = request.query.trim().to_owned();
        if query.is_empty() {
            return Err(Error::invalid_argument("query must not be empty"));
        }
        let top_k = request.top_k.unwrap_or(self.settings.default_top_k);
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(Error::invalid_argument(format!(
                "top_k must be between 1 and {MAX_TOP_K}"
            )));
        }

        let vector = self
            .embedder
            .embed_batch(std::slice::from_ref(&query))
            .await
            .map_err(|e| Error::unavailable(format!("embedding backend: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::unavailable("embedding backend returned no vector"))?;

        let filter = request.filters.as_ref().map(translate_filters);
        let mut results = self
            .store
            .search(&vector, top_k, filter.as_ref())
            .await
            .map_err(|e| Error::unavailable(format!("vector store: {e}")))?;

        if let Some(min_score) = request.min_score {
            results.retain(|r| r.score >= min_score);
        }

        let answer = self.maybe_synthesize(&query, &results).await;

        Ok(QueryResponse {
            query,
            total_results: results.len(),
            results,
            answer,
        })
    }

    async fn maybe_synthesize(&self, query: &str, results: &[SearchResult]) -> Option<String> {
        if !self.settings.synthesis_enabled || results.is_empty() {
            return None;
        }
        let synthesizer = self.synthesizer.as_ref()?;
        let contexts: Vec<String> = results.iter().map(|r| r.text.clone()).collect();
        match synthesizer.synthesize(query, &contexts).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                // Degrade, do not fail: the raw results are still useful.
                warn!(error = %e, "Answer synthesis failed; returning results only");
                None
            }
        }
    }
}

/// Translate caller filters into the vector store's filter dialect.
fn translate_filters(filters: &SearchFilters) -> MetadataFilter {
    let mut translated = MetadataFilter::default();
    if let Some(date) = &filters.date {
        translated.equals.push(("date".to_owned(), date.clone()));
    }
    if let Some(video_id) = &filters.video_id {
        translated
            .equals
            .push(("video_id".to_owned(), video_id.clone()));
    }
    if let Some(speaker_ids) = &filters.speaker_ids {
        translated
            .any_of
            .push(("speakers".to_owned(), speaker_ids.clone()));
    }
    if let Some(source_types) = &filters.source_types {
        translated.any_of.push((
            "source_type".to_owned(),
            source_types.iter().map(|t| t.as_str().to_owned()).collect(),
        ));
    }
    translated
}
