//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `UC_*`
//! environment variables. Merging the layers into a [`CheckConfig`] is left to
//! the caller, which also knows about command-line flags.
//!
//! [`CheckConfig`]: crate::CheckConfig

use crate::error::UrlCheckError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound accepted for a configured concurrency cap.
pub const MAX_CONCURRENCY: usize = 10_000;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// timeout = "5s"
/// concurrency = 50
/// read_body = true
/// user_agent = "uptime-bot/1.0"
/// file = "targets.txt"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Per-probe timeout (as string, e.g. "500ms", "10s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Maximum number of probes in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Whether to read response bodies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_body: Option<bool>,

    /// `User-Agent` header for requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Default target list file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl DefaultsConfig {
    /// The configured timeout, parsed. `None` if unset or invalid.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.as_deref().and_then(parse_timeout_string)
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, UrlCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UrlCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            UrlCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            UrlCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is loaded first, then the global file in `$HOME`, then a
    /// local file in the current directory; later files win field by field.
    /// Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, UrlCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring configuration file");
                }
            }
        }

        if loaded_files.len() > 1 {
            tracing::info!(
                files = ?loaded_files,
                "multiple config files found, later files take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./url-check.toml", "./.url-check.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".url-check.toml", "url-check.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("url-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations; values from `higher` take precedence.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                    concurrency: higher_defaults.concurrency.or(lower_defaults.concurrency),
                    read_body: higher_defaults.read_body.or(lower_defaults.read_body),
                    user_agent: higher_defaults.user_agent.or(lower_defaults.user_agent),
                    file: higher_defaults.file.or(lower_defaults.file),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), UrlCheckError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(concurrency) = defaults.concurrency {
            if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                return Err(UrlCheckError::config(format!(
                    "Concurrency must be between 1 and {}",
                    MAX_CONCURRENCY
                )));
            }
        }

        if let Some(timeout_str) = &defaults.timeout {
            match parse_timeout_string(timeout_str) {
                Some(timeout) if !timeout.is_zero() => {}
                _ => {
                    return Err(UrlCheckError::config(format!(
                        "Invalid timeout '{}'. Use a non-zero value like '500ms', '10s', '2m'",
                        timeout_str
                    )));
                }
            }
        }

        if let Some(user_agent) = &defaults.user_agent {
            if user_agent.trim().is_empty() {
                return Err(UrlCheckError::config("user_agent cannot be empty"));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// Populated from `UC_*` variables. Invalid values are dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub timeout: Option<Duration>,
    pub concurrency: Option<usize>,
    pub read_body: Option<bool>,
    pub user_agent: Option<String>,
    pub file: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from `UC_*` environment variables.
///
/// - `UC_TIMEOUT`: per-probe timeout (`500ms`, `10s`, `2m`)
/// - `UC_CONCURRENCY`: max probes in flight
/// - `UC_READ_BODY`: `true`/`false`
/// - `UC_USER_AGENT`: `User-Agent` header
/// - `UC_FILE`: target list file
/// - `UC_CONFIG`: explicit config file
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("UC_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(timeout) if !timeout.is_zero() => env_config.timeout = Some(timeout),
            _ => tracing::warn!(value = %val, "invalid UC_TIMEOUT, use a format like '500ms', '10s', '2m'"),
        }
    }

    if let Some(val) = lookup("UC_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_CONCURRENCY).contains(&n) => env_config.concurrency = Some(n),
            _ => tracing::warn!(value = %val, max = MAX_CONCURRENCY, "invalid UC_CONCURRENCY"),
        }
    }

    if let Some(val) = lookup("UC_READ_BODY") {
        match parse_bool(&val) {
            Some(enabled) => env_config.read_body = Some(enabled),
            None => tracing::warn!(value = %val, "invalid UC_READ_BODY, use true/false"),
        }
    }

    env_config.user_agent = non_empty(lookup("UC_USER_AGENT"));
    env_config.file = non_empty(lookup("UC_FILE"));
    env_config.config = non_empty(lookup("UC_CONFIG"));

    env_config
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "500ms", "5s", "2m" or a bare number of seconds.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string(" 30S "), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("-5s"), None);
        assert_eq!(parse_timeout_string(""), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
timeout = "3s"
concurrency = 25
read_body = false
user_agent = "uptime-bot/1.0"
file = "targets.txt"
"#,
        );

        let config = ConfigManager::new().load_file(temp_file.path()).unwrap();
        let defaults = config.defaults.unwrap();

        assert_eq!(defaults.timeout_duration(), Some(Duration::from_secs(3)));
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.read_body, Some(false));
        assert_eq!(defaults.user_agent.as_deref(), Some("uptime-bot/1.0"));
        assert_eq!(defaults.file.as_deref(), Some("targets.txt"));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let temp_file = write_config("");
        let config = ConfigManager::new().load_file(temp_file.path()).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_invalid_concurrency() {
        let temp_file = write_config("[defaults]\nconcurrency = 0\n");
        let result = ConfigManager::new().load_file(temp_file.path());
        assert!(matches!(result, Err(UrlCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_timeout() {
        for bad in ["\"soon\"", "\"0s\""] {
            let temp_file = write_config(&format!("[defaults]\ntimeout = {}\n", bad));
            let result = ConfigManager::new().load_file(temp_file.path());
            assert!(result.is_err(), "timeout {} should be rejected", bad);
        }
    }

    #[test]
    fn test_malformed_toml() {
        let temp_file = write_config("[defaults\ntimeout = ");
        let err = ConfigManager::new().load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::new().load_file(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(UrlCheckError::FileError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("5s".to_string()),
                concurrency: Some(10),
                file: Some("global.txt".to_string()),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                timeout: Some("2s".to_string()),
                read_body: Some(false),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.timeout.as_deref(), Some("2s")); // Higher wins
        assert_eq!(defaults.concurrency, Some(10)); // Lower preserved
        assert_eq!(defaults.read_body, Some(false));
        assert_eq!(defaults.file.as_deref(), Some("global.txt"));
    }

    #[test]
    fn test_merge_configs_one_side_empty() {
        let manager = ConfigManager::new();
        let only = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(3),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(FileConfig::default(), only.clone());
        assert_eq!(merged, only);

        let merged = manager.merge_configs(only.clone(), FileConfig::default());
        assert_eq!(merged, only);
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("UC_TIMEOUT", "750ms"),
            ("UC_CONCURRENCY", "8"),
            ("UC_READ_BODY", "off"),
            ("UC_USER_AGENT", "probe/2"),
            ("UC_FILE", "list.txt"),
            ("UC_CONFIG", "  "),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env_config.timeout, Some(Duration::from_millis(750)));
        assert_eq!(env_config.concurrency, Some(8));
        assert_eq!(env_config.read_body, Some(false));
        assert_eq!(env_config.user_agent.as_deref(), Some("probe/2"));
        assert_eq!(env_config.file.as_deref(), Some("list.txt"));
        assert_eq!(env_config.config, None);
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("UC_TIMEOUT", "0s"),
            ("UC_CONCURRENCY", "0"),
            ("UC_READ_BODY", "maybe"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config, EnvConfig::default());
    }
}
