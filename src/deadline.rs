// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Call deadline guard.
//!
//! Two ways to put an operation under a wall-clock limit:
//!
//! ```text
//! async op ──► tokio::time::timeout ──► future dropped at deadline
//! sync op  ──► worker thread ──► recv_timeout on caller ──► worker detached at deadline
//! ```
//!
//! Nothing is armed outside the call: the timer lives inside the `timeout`
//! future or the `recv_timeout` wait, so every exit path (value, error,
//! panic, expiry) disarms it. Guards nest freely and can be used from any
//! thread or task.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{KitError, Result};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);
pub const DEFAULT_MESSAGE: &str = "Timeout";

/// A reusable wall-clock limit plus the message reported when it is hit.
#[derive(Debug, Clone)]
pub struct Deadline {
    limit: Duration,
    message: String,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self { limit, message: DEFAULT_MESSAGE.to_string() }
    }

    /// Replace the message carried by [`KitError::Timeout`].
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn limit(&self) -> Duration { self.limit }
    pub fn message(&self) -> &str { &self.message }

    fn expired(&self, started: Instant) -> KitError {
        warn!(
            limit_ms = self.limit.as_millis() as u64,
            waited_ms = started.elapsed().as_millis() as u64,
            message = %self.message,
            "Deadline expired, abandoning call"
        );
        KitError::Timeout { message: self.message.clone(), limit: self.limit }
    }

    /// Await `op` for at most the configured limit.
    ///
    /// On expiry the future is dropped, so it stops at its current await
    /// point and releases whatever it holds.
    pub async fn run<F>(&self, op: F) -> Result<F::Output>
    where
        F: Future,
    {
        let started = Instant::now();
        match tokio::time::timeout(self.limit, op).await {
            Ok(out) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Guarded call finished");
                Ok(out)
            }
            Err(_) => Err(self.expired(started)),
        }
    }

    /// Like [`Deadline::run`] for fallible operations: the operation's own
    /// error is folded into the crate error instead of nesting results.
    pub async fn try_run<F, T, E>(&self, op: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<KitError>,
    {
        self.run(op).await?.map_err(Into::into)
    }

    /// Run a blocking closure on a supervised worker thread.
    ///
    /// If the limit passes first the worker is detached and left to finish on
    /// its own; its eventual result is discarded. A panic inside `op` is
    /// re-raised on the calling thread.
    pub fn run_blocking<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let (tx, rx) = mpsc::sync_channel(1);
        let worker = thread::Builder::new()
            .name("deadline-worker".into())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(op));
                // The receiver is gone once the caller gave up.
                let _ = tx.send(outcome);
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(Ok(value)) => {
                let _ = worker.join();
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Guarded call finished");
                Ok(value)
            }
            Ok(Err(payload)) => {
                let _ = worker.join();
                panic::resume_unwind(payload)
            }
            Err(RecvTimeoutError::Timeout) => {
                drop(worker);
                Err(self.expired(started))
            }
            Err(RecvTimeoutError::Disconnected) => Err(KitError::Io(std::io::Error::other(
                "deadline worker exited without a result",
            ))),
        }
    }

    /// Decorate a synchronous function. Every call of the returned closure
    /// gets its own fresh deadline.
    ///
    /// ```
    /// use std::time::Duration;
    /// use bucketkit::deadline::Deadline;
    ///
    /// let add = Deadline::new(Duration::from_secs(1)).wrap(|(a, b): (i32, i32)| a + b);
    /// assert_eq!(add((2, 3)).unwrap(), 5);
    /// ```
    pub fn wrap<A, T, F>(self, op: F) -> impl Fn(A) -> Result<T>
    where
        F: Fn(A) -> T + Send + Sync + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        move |args| {
            let op = Arc::clone(&op);
            self.run_blocking(move || op(args))
        }
    }
}
