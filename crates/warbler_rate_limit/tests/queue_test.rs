//! Request queue ordering, pacing, and failure handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use warbler_error::{HttpError, HttpErrorKind, PlatformError, PlatformErrorKind, WarblerError, WarblerResult};
use warbler_rate_limit::{QueueConfig, RequestQueue};

fn platform_error(kind: PlatformErrorKind) -> WarblerError {
    PlatformError::new(kind).into()
}

fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test(start_paused = true)]
async fn operations_run_in_submission_order() {
    let queue = RequestQueue::new(QueueConfig::default());
    let log = recorder();

    let op = |name: &'static str| {
        let log = Arc::clone(&log);
        move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().await.push(name);
                Ok(name)
            }
        }
    };

    let (a, b, c) = tokio::join!(
        queue.submit(op("a")),
        queue.submit(op("b")),
        queue.submit(op("c")),
    );

    assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), ("a", "b", "c"));
    assert_eq!(*log.lock().await, vec!["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn never_more_than_one_in_flight() {
    let queue = RequestQueue::new(QueueConfig::default());
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let queue = queue.clone();
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            queue
                .submit(move || {
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn consecutive_operations_are_spaced_out() {
    let queue = RequestQueue::new(QueueConfig::default());
    let starts = Arc::new(Mutex::new(Vec::new()));

    let op = || {
        let starts = Arc::clone(&starts);
        move || {
            let starts = Arc::clone(&starts);
            async move {
                starts.lock().await.push(Instant::now());
                Ok(())
            }
        }
    };

    let (first, second) = tokio::join!(queue.submit(op()), queue.submit(op()));
    first.unwrap();
    second.unwrap();

    let starts = starts.lock().await;
    let gap = starts[1] - starts[0];
    assert!(gap >= Duration::from_millis(1500), "gap was {gap:?}");
    assert!(gap <= Duration::from_millis(3600), "gap was {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn rate_limited_operation_retries_before_later_ones() {
    let queue = RequestQueue::new(QueueConfig::default());
    let log = recorder();
    let attempts = Arc::new(AtomicU32::new(0));

    let throttled = {
        let log = Arc::clone(&log);
        let attempts = Arc::clone(&attempts);
        move || {
            let log = Arc::clone(&log);
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    log.lock().await.push("throttled:429");
                    Err(platform_error(PlatformErrorKind::RateLimited { reset: None }))
                } else {
                    log.lock().await.push("throttled:ok");
                    Ok("first")
                }
            }
        }
    };
    let follower = {
        let log = Arc::clone(&log);
        move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().await.push("follower");
                Ok("second")
            }
        }
    };

    let (first, second) = tokio::join!(queue.submit(throttled), queue.submit(follower));

    assert_eq!(first.unwrap(), "first");
    assert_eq!(second.unwrap(), "second");
    assert_eq!(
        *log.lock().await,
        vec!["throttled:429", "throttled:ok", "follower"]
    );
}

#[tokio::test(start_paused = true)]
async fn rate_limit_waits_for_reported_reset() {
    let queue = RequestQueue::new(QueueConfig::default());
    let attempts = Arc::new(AtomicU32::new(0));
    let reset = chrono::Utc::now().timestamp() + 30;
    let started = Instant::now();

    let counter = Arc::clone(&attempts);
    let result = queue
        .submit(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(platform_error(PlatformErrorKind::RateLimited {
                        reset: Some(reset),
                    }))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    // Reset is ~30s out plus the one second buffer
    assert!(started.elapsed() >= Duration::from_secs(29));
}

#[tokio::test(start_paused = true)]
async fn transient_failure_is_retried_once_then_surfaced() {
    let queue = RequestQueue::new(QueueConfig::default());
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&attempts);
    let result: Result<(), _> = queue
        .submit(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(platform_error(PlatformErrorKind::Unavailable(
                    "503".to_string(),
                )))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn permanent_failure_is_not_retried() {
    let queue = RequestQueue::new(QueueConfig::default());
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&attempts);
    let result: Result<(), _> = queue
        .submit(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(platform_error(PlatformErrorKind::MalformedResponse(
                    "missing id".to_string(),
                )))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn queue_goes_idle_after_draining() {
    let queue = RequestQueue::new(QueueConfig::default());
    queue.submit(|| async { Ok(()) }).await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(queue.is_idle().await);
    assert_eq!(queue.len().await, 0);

    // A fresh submission restarts the drain task
    assert_eq!(queue.submit(|| async { Ok(7) }).await.unwrap(), 7);
}

fn explode() -> WarblerResult<u32> {
    panic!("operation blew up")
}

#[tokio::test(start_paused = true)]
async fn panicking_operation_does_not_stall_later_ones() {
    let queue = RequestQueue::new(QueueConfig::default());

    let (first, second) = tokio::time::timeout(Duration::from_secs(600), async {
        tokio::join!(
            queue.submit(|| async { explode() }),
            queue.submit(|| async { Ok(2) }),
        )
    })
    .await
    .expect("queue stalled after a panic");

    assert!(first.is_err());
    assert_eq!(second.unwrap(), 2);

    let third = tokio::time::timeout(Duration::from_secs(600), queue.submit(|| async { Ok(3) }))
        .await
        .expect("queue stalled after a panic");
    assert_eq!(third.unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn write_that_may_have_landed_is_not_repeated() {
    let queue = RequestQueue::new(QueueConfig::default());
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&attempts);
    let result: Result<(), _> = queue
        .submit_once(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(HttpError::new(HttpErrorKind::Timeout).into())
            }
        })
        .await;

    assert!(result.unwrap_err().is_delivery_uncertain());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn write_rejected_by_the_platform_is_retried() {
    let queue = RequestQueue::new(QueueConfig::default());
    let attempts = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&attempts);
    let result = queue
        .submit_once(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(platform_error(PlatformErrorKind::Unavailable("503".to_string())))
                } else {
                    Ok("posted")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "posted");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
