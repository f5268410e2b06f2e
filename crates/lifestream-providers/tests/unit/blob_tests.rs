//! Filesystem blob store behavior.

use std::time::Duration;

use lifestream_domain::ports::BlobStore;
use lifestream_providers::blob::LocalBlobStore;

#[tokio::test]
async fn put_get_roundtrip_and_head_hashes_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalBlobStore::new(dir.path()).expect("store");

    store
        .put("uploads/job-1/clip.mp4", b"movie bytes".to_vec(), "video/mp4")
        .await
        .expect("put");

    let bytes = store.get("uploads/job-1/clip.mp4").await.expect("get");
    assert_eq!(bytes, b"movie bytes");

    let info = store.head("uploads/job-1/clip.mp4").await.expect("head");
    assert_eq!(info.size, 11);
    assert_eq!(info.content_hash.len(), 64);

    // Same content, same version; different content, different version.
    store
        .put("uploads/job-2/clip.mp4", b"movie bytes".to_vec(), "video/mp4")
        .await
        .expect("put");
    let twin = store.head("uploads/job-2/clip.mp4").await.expect("head");
    assert_eq!(info.content_hash, twin.content_hash);

    store
        .put("uploads/job-3/clip.mp4", b"other bytes".to_vec(), "video/mp4")
        .await
        .expect("put");
    let other = store.head("uploads/job-3/clip.mp4").await.expect("head");
    assert_ne!(info.content_hash, other.content_hash);
}

#[tokio::test]
async fn missing_objects_report_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalBlobStore::new(dir.path()).expect("store");

    assert!(!store.exists("uploads/ghost").await.expect("exists"));
    let err = store.get("uploads/ghost").await.expect_err("get");
    assert!(err.to_string().contains("Not found"));
    // Deleting a missing object is a no-op.
    store.delete("uploads/ghost").await.expect("delete");
}

#[tokio::test]
async fn presign_creates_prefix_and_sets_expiry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalBlobStore::new(dir.path()).expect("store");

    let grant = store
        .presign_put(
            "uploads/job-9/clip.mp4",
            "video/mp4",
            Duration::from_secs(900),
        )
        .await
        .expect("presign");
    assert!(grant.url.starts_with("file://"));
    assert!(grant.expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn traversal_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = LocalBlobStore::new(dir.path()).expect("store");

    assert!(store.get("../outside").await.is_err());
    assert!(store.get("uploads//double").await.is_err());
}
