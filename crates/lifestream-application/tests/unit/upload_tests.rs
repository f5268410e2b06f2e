//! Upload handshake behavior: validation, idempotent confirm, read paths.

use std::sync::Arc;
use std::time::Duration;

use lifestream_application::settings::UploadSettings;
use lifestream_application::use_cases::UploadService;
use lifestream_domain::entities::JobState;
use lifestream_domain::error::Error;
use lifestream_domain::ports::{BlobStore as _, Queue as _};
use lifestream_providers::blob::LocalBlobStore;
use lifestream_providers::queue::InMemoryQueue;
use lifestream_providers::tables::{InMemoryIdempotencyTable, InMemoryJobTable};

struct Fixture {
    blob: Arc<LocalBlobStore>,
    queue: Arc<InMemoryQueue>,
    service: UploadService,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let blob = Arc::new(LocalBlobStore::new(dir.path()).expect("blob store"));
    let queue = Arc::new(InMemoryQueue::new(3));
    let service = UploadService::new(
        blob.clone(),
        Arc::new(InMemoryJobTable::new()),
        Arc::new(InMemoryIdempotencyTable::new()),
        queue.clone(),
        UploadSettings {
            max_upload_bytes: 10 * 1024 * 1024,
            upload_url_ttl: Duration::from_secs(900),
        },
    );
    Fixture {
        blob,
        queue,
        service,
        _dir: dir,
    }
}

#[tokio::test]
async fn presign_validates_its_inputs() {
    let f = fixture();

    let oversized = f
        .service
        .presign_upload("day.mp4", 11 * 1024 * 1024, "video/mp4")
        .await;
    assert!(matches!(oversized, Err(Error::InvalidArgument { .. })));

    let wrong_type = f.service.presign_upload("day.pdf", 1_000, "application/pdf").await;
    assert!(matches!(wrong_type, Err(Error::InvalidArgument { .. })));

    let empty_name = f.service.presign_upload("  ", 1_000, "video/mp4").await;
    assert!(matches!(empty_name, Err(Error::InvalidArgument { .. })));

    let grant = f
        .service
        .presign_upload("day one.mp4", 1_000, "video/mp4")
        .await
        .expect("valid request");
    assert!(grant.object_key.starts_with("uploads/"));
    assert!(grant.object_key.contains(&grant.job_id));
}

#[tokio::test]
async fn confirm_requires_the_object_to_exist() {
    let f = fixture();
    let missing = f
        .service
        .confirm_upload("job-x", "uploads/job-x/nothing.mp4", None)
        .await;
    assert!(matches!(missing, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn confirm_creates_queued_row_and_enqueues_once() {
    let f = fixture();
    let grant = f
        .service
        .presign_upload("day.mp4", 1_000, "video/mp4")
        .await
        .expect("presign");
    f.blob
        .put(&grant.object_key, b"uploaded video".to_vec(), "video/mp4")
        .await
        .expect("client PUT");

    let job = f
        .service
        .confirm_upload(&grant.job_id, &grant.object_key, Some(93.0))
        .await
        .expect("confirm");
    assert_eq!(job.state, JobState::Queued);
    assert_eq!(job.job_id, grant.job_id);
    assert_eq!(job.client_duration_hint, Some(93.0));

    // The status read works immediately: no 404-after-confirm window.
    let status = f.service.get_status(&grant.job_id).await.expect("status");
    assert_eq!(status.state, JobState::Queued);

    let deliveries = f
        .queue
        .receive(10, Duration::from_secs(1))
        .await
        .expect("receive");
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].message.job_id, grant.job_id);
}

#[tokio::test]
async fn duplicate_confirm_is_idempotent() {
    let f = fixture();
    let grant = f
        .service
        .presign_upload("day.mp4", 1_000, "video/mp4")
        .await
        .expect("presign");
    f.blob
        .put(&grant.object_key, b"uploaded video".to_vec(), "video/mp4")
        .await
        .expect("client PUT");

    let first = f
        .service
        .confirm_upload(&grant.job_id, &grant.object_key, None)
        .await
        .expect("first confirm");
    let second = f
        .service
        .confirm_upload(&grant.job_id, &grant.object_key, None)
        .await
        .expect("second confirm");

    assert_eq!(first.job_id, second.job_id);

    // Exactly one message was enqueued for the pair.
    let deliveries = f
        .queue
        .receive(10, Duration::from_secs(1))
        .await
        .expect("receive");
    assert_eq!(deliveries.len(), 1);
}

#[tokio::test]
async fn summary_of_an_unfinished_job_conflicts() {
    let f = fixture();
    let grant = f
        .service
        .presign_upload("day.mp4", 1_000, "video/mp4")
        .await
        .expect("presign");
    f.blob
        .put(&grant.object_key, b"uploaded video".to_vec(), "video/mp4")
        .await
        .expect("client PUT");
    f.service
        .confirm_upload(&grant.job_id, &grant.object_key, None)
        .await
        .expect("confirm");

    let summary = f.service.get_summary(&grant.job_id).await;
    assert!(matches!(summary, Err(Error::Conflict { .. })));

    let unknown = f.service.get_summary("no-such-job").await;
    assert!(matches!(unknown, Err(Error::NotFound { .. })));
}
