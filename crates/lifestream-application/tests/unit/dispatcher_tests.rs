//! Dispatcher semantics: exactly-once launching, race handling, and the
//! concurrency cap.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lifestream_application::settings::DispatcherSettings;
use lifestream_application::use_cases::Dispatcher;
use lifestream_domain::entities::{Job, JobState};
use lifestream_domain::ports::{IdempotencyTable as _, JobTable as _, Queue as _};
use lifestream_domain::value_objects::WorkMessage;
use lifestream_providers::queue::InMemoryQueue;
use lifestream_providers::tables::{InMemoryIdempotencyTable, InMemoryJobTable};

use crate::test_utils::CountingLauncher;

struct Fixture {
    queue: Arc<InMemoryQueue>,
    jobs: Arc<InMemoryJobTable>,
    idempotency: Arc<InMemoryIdempotencyTable>,
    launcher: Arc<CountingLauncher>,
    dispatcher: Dispatcher,
}

fn fixture_with(settings: DispatcherSettings, launcher: CountingLauncher) -> Fixture {
    let queue = Arc::new(InMemoryQueue::new(3));
    let jobs = Arc::new(InMemoryJobTable::new());
    let idempotency = Arc::new(InMemoryIdempotencyTable::new());
    let launcher = Arc::new(launcher);
    let dispatcher = Dispatcher::new(
        queue.clone(),
        jobs.clone(),
        idempotency.clone(),
        launcher.clone(),
        settings,
    );
    Fixture {
        queue,
        jobs,
        idempotency,
        launcher,
        dispatcher,
    }
}

fn fixture() -> Fixture {
    fixture_with(DispatcherSettings::default(), CountingLauncher::new())
}

fn message(job_id: &str) -> WorkMessage {
    WorkMessage {
        job_id: job_id.to_owned(),
        object_key: format!("uploads/{job_id}/day.mp4"),
        object_version: format!("hash-{job_id}"),
        client_duration_hint: None,
    }
}

/// Seed the claim + row the way `confirm_upload` does.
async fn seed_confirmed(f: &Fixture, job_id: &str) {
    let m = message(job_id);
    f.idempotency
        .claim(&m.object_key, &m.object_version, job_id)
        .await
        .expect("claim");
    f.jobs
        .create(Job::new(job_id, &m.object_key, &m.object_version, None))
        .await
        .expect("create");
    f.queue.send(m).await.expect("send");
}

#[tokio::test]
async fn confirmed_upload_is_dispatched_exactly_once() {
    let f = fixture();
    seed_confirmed(&f, "job-1").await;

    let delivery = f
        .queue
        .receive(1, Duration::from_secs(60))
        .await
        .expect("receive")
        .remove(0);
    f.dispatcher
        .handle_delivery(delivery)
        .await
        .expect("handled");

    assert_eq!(f.launcher.launches(), 1);
    let job = f.jobs.get("job-1").await.expect("get").expect("exists");
    assert_eq!(job.state, JobState::Dispatched);
    assert!(job.task_handle.is_some());

    // The message is gone.
    assert!(
        f.queue
            .receive(1, Duration::from_secs(60))
            .await
            .expect("receive")
            .is_empty()
    );
}

#[tokio::test]
async fn bare_queue_delivery_creates_the_job_row() {
    let f = fixture();
    // No confirm happened: the message arrives straight from a bucket
    // notification.
    f.queue.send(message("job-bare")).await.expect("send");

    let delivery = f
        .queue
        .receive(1, Duration::from_secs(60))
        .await
        .expect("receive")
        .remove(0);
    f.dispatcher
        .handle_delivery(delivery)
        .await
        .expect("handled");

    assert_eq!(f.launcher.launches(), 1);
    let job = f.jobs.get("job-bare").await.expect("get").expect("exists");
    assert_eq!(job.state, JobState::Dispatched);
    let mapped = f
        .idempotency
        .get("uploads/job-bare/day.mp4", "hash-job-bare")
        .await
        .expect("get");
    assert_eq!(mapped.as_deref(), Some("job-bare"));
}

#[tokio::test]
async fn redelivery_of_a_handled_job_launches_nothing() {
    let f = fixture();
    seed_confirmed(&f, "job-1").await;

    let delivery = f
        .queue
        .receive(1, Duration::from_secs(60))
        .await
        .expect("receive")
        .remove(0);
    f.dispatcher
        .handle_delivery(delivery)
        .await
        .expect("handled");

    // A duplicate of the same message (e.g. a crashed dispatcher's
    // redelivery) arrives later.
    f.queue.send(message("job-1")).await.expect("send");
    let duplicate = f
        .queue
        .receive(1, Duration::from_secs(60))
        .await
        .expect("receive")
        .remove(0);
    f.dispatcher
        .handle_delivery(duplicate)
        .await
        .expect("handled");

    assert_eq!(f.launcher.launches(), 1, "no second task for the same job");
}

#[tokio::test]
async fn concurrent_deliveries_of_the_same_job_race_to_one_launch() {
    let f = fixture();
    seed_confirmed(&f, "job-1").await;
    // Two identical messages in flight at once.
    f.queue.send(message("job-1")).await.expect("send");

    let deliveries = f
        .queue
        .receive(2, Duration::from_secs(60))
        .await
        .expect("receive");
    assert_eq!(deliveries.len(), 2);
    let mut iter = deliveries.into_iter();
    let (a, b) = (iter.next().expect("a"), iter.next().expect("b"));

    let (ra, rb) = tokio::join!(f.dispatcher.handle_delivery(a), f.dispatcher.handle_delivery(b));
    ra.expect("first handled");
    rb.expect("second handled");

    assert_eq!(f.launcher.launches(), 1, "CAS admits exactly one winner");
}

#[tokio::test]
async fn run_loop_respects_the_concurrency_cap() {
    let settings = DispatcherSettings {
        max_concurrent_tasks: 3,
        queue_visibility: Duration::from_secs(60),
        idle_backoff: Duration::from_millis(5),
    };
    let f = fixture_with(settings, CountingLauncher::holding(Duration::from_millis(25)));

    for i in 0..20 {
        seed_confirmed(&f, &format!("job-{i}")).await;
    }

    let cancel = CancellationToken::new();
    let dispatcher = f.dispatcher.clone();
    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move { dispatcher.run(loop_cancel).await });

    // All twenty jobs eventually dispatch, never more than three launch
    // calls in flight at once.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while f.launcher.launches() < 20 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "dispatcher stalled at {} launches",
            f.launcher.launches()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();
    handle.await.expect("loop exits");

    assert_eq!(f.launcher.launches(), 20);
    assert!(
        f.launcher.peak_concurrency() <= 3,
        "peak concurrency {} exceeded the cap",
        f.launcher.peak_concurrency()
    );
}
