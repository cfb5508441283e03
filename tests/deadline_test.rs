//! Deadline guard tests: blocking wrapper, async futures, and reuse after expiry.
//!
//! Run with: `cargo test`

use std::thread;
use std::time::{Duration, Instant};

use bucketkit::deadline::{Deadline, DEFAULT_DEADLINE};
use bucketkit::error::KitError;

/// One time unit in these tests.
fn units(n: u64) -> Duration {
    Duration::from_millis(250 * n)
}

fn slow_multiply() -> impl Fn((i64, i64, u64)) -> bucketkit::Result<i64> {
    Deadline::new(units(3)).wrap(|(a, b, delay): (i64, i64, u64)| {
        thread::sleep(units(delay));
        a * b
    })
}

#[test]
fn test_default_deadline() {
    let d = Deadline::default();
    assert_eq!(d.limit(), DEFAULT_DEADLINE);
    assert_eq!(d.limit(), Duration::from_secs(30));
    assert_eq!(d.message(), "Timeout");
}

#[test]
fn test_multiply_finishes_before_deadline() {
    let multiply = slow_multiply();
    assert_eq!(multiply((5, 10, 2)).expect("within deadline"), 50);
}

#[test]
fn test_multiply_times_out() {
    let multiply = slow_multiply();
    let started = Instant::now();
    let err = multiply((5, 10, 5)).unwrap_err();
    assert!(err.is_timeout());
    // The caller is released at the deadline, not when the worker finishes.
    assert!(started.elapsed() < units(5));
    match err {
        KitError::Timeout { message, limit } => {
            assert_eq!(message, "Timeout");
            assert_eq!(limit, units(3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_multiply_no_delay() {
    let multiply = slow_multiply();
    assert_eq!(multiply((2, 3, 0)).unwrap(), 6);
}

#[test]
fn test_custom_timeout_message() {
    let delayed = Deadline::new(units(1))
        .with_message("Custom timeout message")
        .wrap(|()| thread::sleep(units(2)));
    let err = delayed(()).unwrap_err();
    assert!(err.to_string().contains("Custom timeout message"));
}

#[test]
fn test_expired_call_does_not_affect_next_call() {
    let multiply = slow_multiply();
    assert!(multiply((5, 10, 5)).unwrap_err().is_timeout());

    let started = Instant::now();
    assert_eq!(multiply((4, 4, 0)).unwrap(), 16);
    assert!(started.elapsed() < units(3));
}

#[test]
fn test_nested_guards() {
    let outer = Deadline::new(units(8));
    let result = outer
        .run_blocking(|| {
            Deadline::new(units(1)).run_blocking(|| {
                thread::sleep(units(3));
                1
            })
        })
        .expect("outer deadline not reached");
    assert!(result.unwrap_err().is_timeout());
}

#[test]
fn test_guards_on_several_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            thread::spawn(move || {
                Deadline::new(units(4)).run_blocking(move || {
                    thread::sleep(units(1));
                    i * 2
                })
            })
        })
        .collect();
    let mut results: Vec<u64> = handles
        .into_iter()
        .map(|h| h.join().expect("thread").expect("within deadline"))
        .collect();
    results.sort();
    assert_eq!(results, vec![0, 2, 4, 6]);
}

#[test]
#[should_panic(expected = "boom")]
fn test_panic_is_propagated() {
    let _ = Deadline::new(units(4)).run_blocking(|| -> u32 { panic!("boom") });
}

#[tokio::test]
async fn test_async_finishes_before_deadline() {
    let d = Deadline::new(units(3));
    let out = d
        .run(async {
            tokio::time::sleep(units(1)).await;
            5 * 10
        })
        .await
        .expect("within deadline");
    assert_eq!(out, 50);
}

#[tokio::test]
async fn test_async_times_out_and_guard_is_reusable() {
    let d = Deadline::new(units(1)).with_message("slow storage call");
    let err = d.run(tokio::time::sleep(units(4))).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.to_string().contains("slow storage call"));

    let out = d.run(async { "fast" }).await.unwrap();
    assert_eq!(out, "fast");
}

#[tokio::test]
async fn test_try_run_keeps_operation_error() {
    let d = Deadline::new(units(2));
    let err = d
        .try_run(async { Err::<(), _>(KitError::Config("bad".into())) })
        .await
        .unwrap_err();
    assert!(!err.is_timeout());
    assert!(matches!(err, KitError::Config(_)));

    let ok = d.try_run(async { Ok::<_, KitError>(7) }).await.unwrap();
    assert_eq!(ok, 7);
}
