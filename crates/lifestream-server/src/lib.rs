//! HTTP transport for LifeStream.
//!
//! Exposes the versioned `/api/v1` surface over the application services:
//! presigned-upload handshake, upload confirmation, job status, summary
//! retrieval, and the query endpoint, plus `/health`.

pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the full router over the given state.
pub fn build_router(state: std::sync::Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/upload/presigned-url", post(handlers::upload::presign))
        .route("/upload/confirm", post(handlers::upload::confirm))
        .route("/status/{job_id}", get(handlers::status::get_status))
        .route("/summary/{job_id}", get(handlers::summary::get_summary))
        .route("/query", post(handlers::query::query));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
