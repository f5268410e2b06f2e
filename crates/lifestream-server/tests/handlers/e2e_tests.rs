//! End-to-end flows over the full mock-backend stack: presign → PUT →
//! confirm → dispatch → pipeline → summary → query.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::harness::{TestApp, get, post, test_app};

/// "PUT to the presigned URL": the local provider's URL is a file path.
fn put_via_presigned_url(url: &str, bytes: &[u8]) {
    let path = url
        .strip_prefix("file://")
        .and_then(|rest| rest.split('?').next())
        .expect("local presigned URL");
    std::fs::write(path, bytes).expect("client PUT");
}

/// Mock-probe scale: 160 kB of content per second of video.
fn video_bytes(seconds: usize) -> Vec<u8> {
    (0..seconds * 160_000).map(|i| (i % 251) as u8 + 1).collect()
}

async fn upload_and_confirm(app: &TestApp, seconds: usize) -> (String, String) {
    let presign = post(
        &app.router,
        "/api/v1/upload/presigned-url",
        json!({"filename": "day.mp4", "size": seconds * 160_000, "content_type": "video/mp4"}),
    )
    .await;
    assert_eq!(presign.status, StatusCode::OK);
    let grant = presign.json();
    let job_id = grant["job_id"].as_str().expect("job_id").to_owned();
    let object_key = grant["object_key"].as_str().expect("object_key").to_owned();

    put_via_presigned_url(
        grant["upload_url"].as_str().expect("upload_url"),
        &video_bytes(seconds),
    );

    let confirm = post(
        &app.router,
        "/api/v1/upload/confirm",
        json!({"job_id": job_id, "object_key": object_key, "client_duration_hint": seconds as f64}),
    )
    .await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert_eq!(confirm.json()["state"], "queued");
    (job_id, object_key)
}

async fn await_state(app: &TestApp, job_id: &str, wanted: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    loop {
        let status = get(&app.router, &format!("/api/v1/status/{job_id}")).await;
        assert_eq!(status.status, StatusCode::OK);
        let state = status.json()["state"].as_str().expect("state").to_owned();
        if state == wanted {
            return;
        }
        assert!(
            state != "failed" || wanted == "failed",
            "job failed unexpectedly: {:?}",
            status.json()
        );
        assert!(
            tokio::time::Instant::now() < deadline,
            "job stuck in '{state}' waiting for '{wanted}'"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn upload_processes_to_a_searchable_summary() {
    let app = test_app().await;
    let cancel = CancellationToken::new();
    let dispatcher = app.context.dispatcher.clone();
    let loop_cancel = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move { dispatcher.run(loop_cancel).await });

    let (job_id, _object_key) = upload_and_confirm(&app, 90).await;
    await_state(&app, &job_id, "completed").await;

    // Completed row invariants.
    let status = get(&app.router, &format!("/api/v1/status/{job_id}")).await;
    let row = status.json();
    assert_eq!(row["progress"], 1.0);
    assert!(row["result_key"].as_str().is_some());
    assert!(row["failure_report_key"].is_null());

    // Summary is served with at least one time block.
    let summary = get(&app.router, &format!("/api/v1/summary/{job_id}")).await;
    assert_eq!(summary.status, StatusCode::OK);
    let body = summary.json();
    let blocks = body["time_blocks"].as_array().expect("time_blocks");
    assert!(!blocks.is_empty());
    assert!(
        body["summary_markdown"]
            .as_str()
            .expect("markdown")
            .contains("## 00:00:00")
    );

    // The indexed memory answers a query referencing this video. Indexing
    // runs just after completion, so allow it a moment.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let query = post(
            &app.router,
            "/api/v1/query",
            json!({"query": "what was discussed", "top_k": 3}),
        )
        .await;
        assert_eq!(query.status, StatusCode::OK);
        let result = query.json();
        if result["total_results"].as_u64().unwrap_or(0) >= 1 {
            let hit = &result["results"][0];
            assert_eq!(hit["metadata"]["video_id"].as_str(), Some(job_id.as_str()));
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "index never became queryable"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    cancel.cancel();
    dispatcher_handle.await.expect("dispatcher loop exits");
}

#[tokio::test]
async fn summary_conflicts_until_the_job_completes() {
    let app = test_app().await;
    // No dispatcher running: the job stays queued.
    let (job_id, _object_key) = upload_and_confirm(&app, 5).await;

    let summary = get(&app.router, &format!("/api/v1/summary/{job_id}")).await;
    assert_eq!(summary.status, StatusCode::CONFLICT);
    assert_eq!(summary.json()["error"], "conflict");
}

#[tokio::test]
async fn duplicate_confirm_returns_the_same_job() {
    let app = test_app().await;
    let (job_id, object_key) = upload_and_confirm(&app, 5).await;

    let second = post(
        &app.router,
        "/api/v1/upload/confirm",
        json!({"job_id": job_id, "object_key": object_key}),
    )
    .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.json()["job_id"].as_str(), Some(job_id.as_str()));
}
