//! Single-target HTTP probing.
//!
//! A [`Prober`] issues one GET per call and turns whatever happens into a
//! [`ProbeResult`]. It never returns an error: transport problems, timeouts and
//! unreadable bodies are all reported as `ProbeResult::Failure`.

use crate::error::{describe_error, UrlCheckError};
use crate::types::{CheckConfig, FailureKind, ProbeResult};
use std::time::{Duration, Instant};

/// HTTP prober shared by every probe of a run.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted, so
/// each task gets its own handle onto the same connection pool.
#[derive(Clone, Debug)]
pub struct Prober {
    /// HTTP client with the run's timeout and user agent baked in
    http_client: reqwest::Client,
    /// Whether to drain the body to measure its size
    read_body: bool,
}

impl Prober {
    /// Build a prober from a run configuration.
    ///
    /// The timeout is installed as reqwest's total timeout, which covers
    /// connecting, sending, receiving headers and reading the body.
    pub fn new(config: &CheckConfig) -> Result<Self, UrlCheckError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http_client,
            read_body: config.read_body,
        })
    }

    /// Probe a single target.
    ///
    /// Any HTTP status counts as a response. The returned elapsed time runs
    /// from just before the request is sent until the body has been read (or
    /// until the failure, for failed probes).
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();

        let mut response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return failure(url, start.elapsed(), classify(&e, false), &e),
        };

        let status = response.status().as_u16();

        let size = if self.read_body {
            let mut size: u64 = 0;
            loop {
                match response.chunk().await {
                    Ok(Some(chunk)) => size += chunk.len() as u64,
                    Ok(None) => break,
                    Err(e) => return failure(url, start.elapsed(), classify(&e, true), &e),
                }
            }
            Some(size)
        } else {
            None
        };

        let elapsed = start.elapsed();
        tracing::debug!(url, status, ?elapsed, ?size, "probe succeeded");

        ProbeResult::Success {
            status,
            url: url.to_string(),
            elapsed,
            size,
        }
    }
}

fn failure(url: &str, elapsed: Duration, kind: FailureKind, err: &reqwest::Error) -> ProbeResult {
    let error = describe_error(err);
    tracing::debug!(url, %kind, ?elapsed, error = %error, "probe failed");

    ProbeResult::Failure {
        url: url.to_string(),
        elapsed,
        kind,
        error,
    }
}

/// Map a reqwest error onto a failure kind.
///
/// Timeouts win over everything else: a body that stalls past the deadline is a
/// timeout, not a body read failure.
fn classify(err: &reqwest::Error, after_status: bool) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if after_status || err.is_body() || err.is_decode() {
        FailureKind::BodyRead
    } else if err.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Request
    }
}
