//! Concurrent fan-out/fan-in of probes.
//!
//! Every target gets its own tokio task, spawned eagerly into a `JoinSet`. A
//! supervisor task drains the set with `join_next_with_id` and forwards each
//! result into an unbounded channel as it completes. The supervisor owns the only
//! sender, so the channel closes exactly when the last probe has been joined:
//! consumers see end-of-stream only after every result has been delivered.

use crate::probe::Prober;
use crate::types::{FailureKind, ProbeResult};
use futures::{FutureExt, Stream};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinSet};

/// Manages concurrent probing operations.
pub struct ConcurrentProcessor {
    /// Optional cap on in-flight probes; `None` means one task per target, all at once
    limiter: Option<Arc<Semaphore>>,
}

impl ConcurrentProcessor {
    /// Create a new concurrent processor.
    ///
    /// `max_concurrency` of `None` runs every probe at once. `Some(0)` is
    /// treated as `Some(1)`.
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self {
            limiter: max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Launch one probe per target and return the stream of their results.
    ///
    /// All tasks are spawned before this returns. Results arrive in completion
    /// order, and the stream yields exactly `targets.len()` items before it
    /// ends.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, prober: &Prober, targets: &[String]) -> ResultStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut probes = JoinSet::new();

        tracing::info!(
            targets = targets.len(),
            limit = ?self.limiter.as_ref().map(|s| s.available_permits()),
            "dispatching probes"
        );

        let mut pending = HashMap::with_capacity(targets.len());

        for url in targets {
            let prober = prober.clone();
            let target = url.clone();
            let limiter = self.limiter.clone();

            let handle = probes.spawn(async move {
                // The permit is held until the probe is done; the timer starts after it is granted.
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                run_probe(&prober, target).await
            });
            pending.insert(handle.id(), url.clone());
        }

        tokio::spawn(forward_results(probes, pending, tx));

        ResultStream {
            receiver: rx,
            expected: targets.len(),
            received: 0,
        }
    }
}

/// Drain finished probes into the channel in completion order.
///
/// A task that ends without a result (aborted, or a panic that escaped
/// `run_probe`) still reports an `Internal` failure for its target, timed from
/// the start of the dispatch. Dropping `tx` at the end closes the stream.
async fn forward_results(
    mut probes: JoinSet<ProbeResult>,
    mut pending: HashMap<task::Id, String>,
    tx: mpsc::UnboundedSender<ProbeResult>,
) {
    let started = Instant::now();
    let mut delivered = 0usize;

    while let Some(joined) = probes.join_next_with_id().await {
        let result = match joined {
            Ok((id, result)) => {
                pending.remove(&id);
                result
            }
            Err(e) => {
                let url = pending.remove(&e.id()).unwrap_or_default();
                tracing::error!(url = %url, error = %e, "probe task did not complete");
                ProbeResult::Failure {
                    url,
                    elapsed: started.elapsed(),
                    kind: FailureKind::Internal,
                    error: format!("probe task failed: {}", e),
                }
            }
        };

        delivered += 1;
        // A dropped receiver just means nobody is listening any more.
        let _ = tx.send(result);
    }

    tracing::info!(delivered, elapsed = ?started.elapsed(), "all probes finished");
}

/// Run one probe, turning a panic inside it into a `Failure` so every target
/// still produces exactly one result.
async fn run_probe(prober: &Prober, url: String) -> ProbeResult {
    let start = Instant::now();
    let outcome = AssertUnwindSafe(prober.probe(&url)).catch_unwind().await;

    match outcome {
        Ok(result) => result,
        Err(panic) => {
            let error = format!("probe panicked: {}", panic_message(panic.as_ref()));
            tracing::error!(url = %url, error = %error, "probe crashed");
            ProbeResult::Failure {
                url,
                elapsed: start.elapsed(),
                kind: FailureKind::Internal,
                error,
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}

/// Results of a dispatch, in completion order.
///
/// Implements [`Stream`]; it ends once every probe of the dispatch has
/// reported. Dropping it early does not cancel the probes, their results are
/// discarded.
#[derive(Debug)]
pub struct ResultStream {
    receiver: mpsc::UnboundedReceiver<ProbeResult>,
    expected: usize,
    received: usize,
}

impl ResultStream {
    /// Number of targets submitted, i.e. the number of results this stream yields.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of results handed out so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Wait for the next result; `None` once every probe has reported.
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        let next = self.receiver.recv().await;
        if next.is_some() {
            self.received += 1;
        }
        next
    }

    /// Drain the stream into a vector, in completion order.
    pub async fn collect_all(mut self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.expected);
        while let Some(result) = self.recv().await {
            results.push(result);
        }
        results
    }
}

impl Stream for ResultStream {
    type Item = ProbeResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.receiver.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.received += 1;
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.expected.saturating_sub(self.received);
        (remaining, Some(remaining))
    }
}
