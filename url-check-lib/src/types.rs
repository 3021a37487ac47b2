//! Core data types for URL probing.
//!
//! This module defines the probe outcome, failure classification, and the
//! configuration shared by every probe in a run.

use std::fmt;
use std::time::Duration;

/// Default timeout applied to each probe's full request/response cycle.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` header sent with every probe.
pub const DEFAULT_USER_AGENT: &str = concat!("url-check/", env!("CARGO_PKG_VERSION"));

/// Outcome of probing a single target.
///
/// Exactly one `ProbeResult` is produced per target submitted to a dispatch.
/// Any HTTP status (including 4xx and 5xx) is a `Success`; only transport-level
/// problems, or a body that cannot be read, are a `Failure`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    /// A complete HTTP response was received.
    Success {
        /// HTTP status code (e.g. 200, 404, 500)
        status: u16,
        /// The target as it was submitted
        url: String,
        /// Wall time from request start to the end of the body
        elapsed: Duration,
        /// Body size in bytes, `None` when body reading is disabled
        size: Option<u64>,
    },

    /// No complete response could be obtained.
    Failure {
        /// The target as it was submitted
        url: String,
        /// Wall time from request start to the failure
        elapsed: Duration,
        /// What kind of failure this was
        kind: FailureKind,
        /// Human-readable description of the underlying error
        error: String,
    },
}

impl ProbeResult {
    /// The target this result belongs to.
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    /// Time spent on this probe.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. } | Self::Failure { elapsed, .. } => *elapsed,
        }
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure classification, if this probe failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Renders the one-line report for this result:
///
/// ```text
/// [200] `https://example.com` (153.2ms) (size: 1256)
/// [ERROR] `https://nope.invalid` (12.9ms) - error sending request: dns error
/// ```
impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                status,
                url,
                elapsed,
                size,
            } => {
                write!(f, "[{}] `{}` ({:?})", status, url, elapsed)?;
                if let Some(size) = size {
                    write!(f, " (size: {})", size)?;
                }
                Ok(())
            }
            Self::Failure {
                url,
                elapsed,
                error,
                ..
            } => write!(f, "[ERROR] `{}` ({:?}) - {}", url, elapsed, error),
        }
    }
}

/// Classification of a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// DNS resolution, TCP connect or TLS handshake failed
    Connect,
    /// The timeout expired before the response was complete
    Timeout,
    /// Any other error before a status line was received (bad URL, protocol error, ...)
    Request,
    /// A status line arrived but the body could not be read
    BodyRead,
    /// The probe itself crashed
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connect => write!(f, "connect"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Request => write!(f, "request"),
            FailureKind::BodyRead => write!(f, "body read"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}

/// Configuration options for a probing run.
///
/// The timeout is shared by all probes in a run; there is no per-target
/// override.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Bound on each probe's full request/response cycle (connect, headers, body)
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Maximum number of probes in flight at once
    /// Default: None (one in-flight request per target)
    pub concurrency: Option<usize>,

    /// Whether to read response bodies to report their size
    /// Default: true
    pub read_body: bool,

    /// `User-Agent` header sent with each request
    pub user_agent: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: None,
            read_body: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckConfig {
    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap the number of probes in flight. `None` removes the cap.
    ///
    /// A cap of zero would never start anything, so it is raised to 1.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency.map(|n| n.max(1));
        self
    }

    /// Enable or disable reading response bodies.
    pub fn with_read_body(mut self, enabled: bool) -> Self {
        self.read_body = enabled;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
