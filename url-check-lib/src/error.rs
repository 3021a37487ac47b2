//! Error handling for URL checking operations.
//!
//! Only failures that abort a run live here. Per-target transport problems are
//! never errors at this level: they become [`ProbeResult::Failure`] values.
//!
//! [`ProbeResult::Failure`]: crate::ProbeResult::Failure

use std::fmt;

/// Main error type for URL checking operations.
#[derive(Debug, Clone)]
pub enum UrlCheckError {
    /// File I/O errors when reading target lists or config files
    FileError { path: String, message: String },

    /// Configuration errors (invalid settings, unparsable files, etc.)
    ConfigError { message: String },

    /// Network-related errors outside a single probe (e.g. building the client)
    NetworkError {
        message: String,
        source: Option<String>,
    },
}

impl UrlCheckError {
    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for UrlCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for UrlCheckError {}

impl From<reqwest::Error> for UrlCheckError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_with_source("Failed to create HTTP client", describe_error(&err))
    }
}

/// Flatten an error and its `source()` chain into a single line.
///
/// reqwest's top-level message ("error sending request for url ...") hides the
/// useful part (connection refused, dns error, ...), which lives further down
/// the chain. Messages already contained in the previous link are skipped.
pub fn describe_error(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(src) = err.source() {
        let msg = src.to_string();
        if !msg.is_empty() && !s.contains(&msg) {
            s.push_str(": ");
            s.push_str(&msg);
        }
        err = src;
    }
    s
}
