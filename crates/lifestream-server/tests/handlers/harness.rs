//! Axum test harness — in-process request dispatch via
//! `tower::ServiceExt::oneshot` over a fully wired mock-backend context.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use lifestream_infrastructure::bootstrap::AppContext;
use lifestream_infrastructure::config::AppConfig;
use lifestream_server::{AppState, build_router};

/// A wired application over temp directories, plus the router.
pub struct TestApp {
    pub router: Router,
    pub context: AppContext,
    _dirs: (tempfile::TempDir, tempfile::TempDir),
}

pub async fn test_app() -> TestApp {
    let blob_dir = tempfile::tempdir().expect("blob tempdir");
    let work_dir = tempfile::tempdir().expect("work tempdir");

    let mut config = AppConfig::default();
    config.storage.blob_root = blob_dir.path().to_path_buf();
    config.storage.max_upload_bytes = 64 * 1024 * 1024;
    config.pipeline.work_dir = work_dir.path().to_path_buf();
    config.speakers.registry_path = blob_dir.path().join("speakers.yaml");

    let context = AppContext::build(config).await.expect("context builds");
    let state = Arc::new(AppState {
        upload: context.upload_service.clone(),
        search: context.search_service.clone(),
        provider_names: context.provider_names.clone(),
    });
    TestApp {
        router: build_router(state),
        context,
        _dirs: (blob_dir, work_dir),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be valid JSON")
    }
}

pub async fn get(router: &Router, path: &str) -> TestResponse {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("valid GET request");
    dispatch(router.clone(), request).await
}

pub async fn post(router: &Router, path: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid POST request");
    dispatch(router.clone(), request).await
}

async fn dispatch(router: Router, request: Request<Body>) -> TestResponse {
    let response = router
        .oneshot(request)
        .await
        .expect("router should handle request");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("should collect response body")
        .to_bytes()
        .to_vec();
    TestResponse { status, body }
}
