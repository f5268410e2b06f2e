//! Endpoint contract tests: status codes and response shapes.

use axum::http::StatusCode;
use serde_json::json;

use crate::harness::{get, post, test_app};

#[tokio::test]
async fn health_reports_providers() {
    let app = test_app().await;
    let response = get(&app.router, "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"]["vector_store"], "memory");
}

#[tokio::test]
async fn presign_rejects_non_video_uploads() {
    let app = test_app().await;
    let response = post(
        &app.router,
        "/api/v1/upload/presigned-url",
        json!({"filename": "notes.pdf", "size": 1000, "content_type": "application/pdf"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "bad_request");
}

#[tokio::test]
async fn presign_returns_a_grant() {
    let app = test_app().await;
    let response = post(
        &app.router,
        "/api/v1/upload/presigned-url",
        json!({"filename": "day.mp4", "size": 1000, "content_type": "video/mp4"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert!(body["job_id"].as_str().is_some());
    assert!(body["upload_url"].as_str().is_some());
    assert!(
        body["object_key"]
            .as_str()
            .expect("object_key")
            .starts_with("uploads/")
    );
}

#[tokio::test]
async fn confirm_of_a_missing_object_is_not_found() {
    let app = test_app().await;
    let response = post(
        &app.router,
        "/api/v1/upload/confirm",
        json!({"job_id": "job-x", "object_key": "uploads/job-x/ghost.mp4"}),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "not_found");
}

#[tokio::test]
async fn status_of_an_unknown_job_is_not_found() {
    let app = test_app().await;
    let response = get(&app.router, "/api/v1/status/no-such-job").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_of_an_unknown_job_is_not_found() {
    let app = test_app().await;
    let response = get(&app.router, "/api/v1/summary/no-such-job").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_with_an_empty_body_is_bad_request() {
    let app = test_app().await;
    let response = post(&app.router, "/api/v1/query", json!({"query": ""})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_over_an_empty_index_returns_no_results() {
    let app = test_app().await;
    let response = post(
        &app.router,
        "/api/v1/query",
        json!({"query": "what was discussed", "top_k": 3}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["total_results"], 0);
    assert!(body["answer"].is_null());
}
