//! # URL Check Library
//!
//! Concurrent HTTP liveness and latency probing for lists of URLs.
//!
//! Every target gets its own task; results stream back in completion order and
//! the stream ends only after every probe has reported. Each target yields
//! exactly one [`ProbeResult`]: any HTTP status is a success, transport errors
//! and unreadable bodies are failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use url_check_lib::{load_targets, CheckConfig, UrlChecker};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let urls = load_targets("urls.txt")?;
//!     let checker = UrlChecker::with_config(
//!         CheckConfig::default().with_timeout(Duration::from_secs(5)),
//!     )?;
//!
//!     for result in checker.check_urls(&urls).await {
//!         println!("{}", result);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export main public API types and functions
pub use checker::UrlChecker;
pub use concurrent::{ConcurrentProcessor, ResultStream};
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::{describe_error, UrlCheckError};
pub use loader::{load_targets, read_targets};
pub use probe::Prober;
pub use types::{CheckConfig, FailureKind, ProbeResult, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

mod checker;
mod concurrent;
mod config;
mod error;
mod loader;
mod probe;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, UrlCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
}
