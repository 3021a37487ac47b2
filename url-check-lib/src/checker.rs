//! Main URL checker implementation.
//!
//! This module provides the primary `UrlChecker` struct that ties together the
//! target loader, the HTTP prober and the concurrent dispatcher.

use crate::concurrent::{ConcurrentProcessor, ResultStream};
use crate::error::UrlCheckError;
use crate::loader::load_targets;
use crate::probe::Prober;
use crate::types::{CheckConfig, ProbeResult};
use std::path::Path;

/// Main URL checker that coordinates probing operations.
///
/// # Example
///
/// ```rust,no_run
/// use url_check_lib::UrlChecker;
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = UrlChecker::new()?;
///     let urls = vec!["https://example.com".to_string(), "https://example.org".to_string()];
///
///     let mut stream = checker.check_urls_stream(&urls);
///     while let Some(result) = stream.next().await {
///         println!("{}", result);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct UrlChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// HTTP prober built from `config`
    prober: Prober,
}

impl UrlChecker {
    /// Create a new URL checker with default configuration.
    ///
    /// Default settings:
    /// - Timeout: 10 seconds
    /// - Concurrency: unbounded (one in-flight request per target)
    /// - Body reading: enabled
    pub fn new() -> Result<Self, UrlCheckError> {
        Self::with_config(CheckConfig::default())
    }

    /// Create a new URL checker with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use url_check_lib::{CheckConfig, UrlChecker};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_timeout(Duration::from_secs(3))
    ///     .with_concurrency(Some(50));
    ///
    /// let checker = UrlChecker::with_config(config).unwrap();
    /// assert_eq!(checker.config().timeout, Duration::from_secs(3));
    /// ```
    pub fn with_config(config: CheckConfig) -> Result<Self, UrlCheckError> {
        let prober = Prober::new(&config)?;
        Ok(Self { config, prober })
    }

    /// Probe a single URL.
    pub async fn check_url(&self, url: &str) -> ProbeResult {
        self.prober.probe(url).await
    }

    /// Probe many URLs concurrently and collect every result.
    ///
    /// The returned vector has one entry per input, in completion order (not
    /// input order).
    pub async fn check_urls(&self, urls: &[String]) -> Vec<ProbeResult> {
        self.check_urls_stream(urls).collect_all().await
    }

    /// Probe many URLs concurrently and stream results as they complete.
    ///
    /// All probes are started before this returns.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn check_urls_stream(&self, urls: &[String]) -> ResultStream {
        ConcurrentProcessor::new(self.config.concurrency).dispatch(&self.prober, urls)
    }

    /// Read URLs from a file (one per line) and probe them all.
    ///
    /// # Errors
    ///
    /// Returns `UrlCheckError::FileError` if the file cannot be read. No
    /// request is made in that case.
    pub async fn check_urls_from_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<Vec<ProbeResult>, UrlCheckError> {
        let urls = load_targets(file_path)?;
        Ok(self.check_urls(&urls).await)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Update the configuration for this checker.
    ///
    /// Rebuilds the HTTP client, since the timeout and user agent live there.
    /// On error the previous configuration stays in place.
    pub fn set_config(&mut self, config: CheckConfig) -> Result<(), UrlCheckError> {
        self.prober = Prober::new(&config)?;
        self.config = config;
        Ok(())
    }
}
