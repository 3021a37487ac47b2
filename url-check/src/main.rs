//! URL Check CLI Application
//!
//! Reads a list of URLs from a file, probes all of them concurrently and prints
//! one line per result as soon as it arrives.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::process;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use url_check_lib::{
    load_env_config, load_targets, parse_timeout_string, CheckConfig, ConfigManager,
    DefaultsConfig, EnvConfig, FileConfig, ProbeResult, UrlChecker,
};

/// Target list used when nothing else is configured.
const DEFAULT_FILE: &str = "urls.txt";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for url-check
#[derive(Parser, Debug)]
#[command(name = "url-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check liveness and latency of a list of URLs concurrently")]
#[command(
    long_about = "Check liveness and latency of a list of URLs concurrently.\n\nEvery URL in FILE (one per line) is requested at the same time; results are printed as they arrive."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// File with URLs to check, one per line [default: urls.txt]
    #[arg(value_name = "FILE", help_heading = "Input")]
    pub file: Option<String>,

    /// Per-request timeout, e.g. 500ms, 10s, 2m [default: 10s]
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        value_parser = parse_timeout_arg,
        help_heading = "Performance"
    )]
    pub timeout: Option<Duration>,

    /// Max requests in flight [default: unlimited]
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// Don't download response bodies (no size is reported)
    #[arg(long = "no-body", help_heading = "Output")]
    pub no_body: bool,

    /// Print a summary after all results
    #[arg(short = 's', long = "summary", help_heading = "Output")]
    pub summary: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logs on stderr
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

fn parse_timeout_arg(value: &str) -> Result<Duration, String> {
    parse_timeout_string(value)
        .ok_or_else(|| format!("invalid duration '{}', use a format like 500ms, 10s, 2m", value))
}

/// Outcome counts for the run summary
#[derive(Debug, Default)]
pub(crate) struct RunStats {
    pub(crate) responded: usize,
    pub(crate) failures: BTreeMap<String, usize>,
}

impl RunStats {
    fn record(&mut self, result: &ProbeResult) {
        match result.failure_kind() {
            None => self.responded += 1,
            Some(kind) => *self.failures.entry(kind.to_string()).or_default() += 1,
        }
    }

    fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    fn total(&self) -> usize {
        self.responded + self.failed()
    }

    fn format_summary(&self, duration: Duration) -> String {
        let mut summary = format!(
            "Summary: {} checked, {} responded, {} failed in {:.2?}",
            self.total(),
            self.responded,
            self.failed(),
            duration
        );

        if !self.failures.is_empty() {
            let breakdown: Vec<String> = self
                .failures
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind))
                .collect();
            summary.push_str(&format!(" ({})", breakdown.join(", ")));
        }

        summary
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(&args);

    if let Err(e) = run_url_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.concurrency == Some(0) {
        return Err("Concurrency must be at least 1".to_string());
    }

    if args.timeout.is_some_and(|t| t.is_zero()) {
        return Err("Timeout must be greater than zero".to_string());
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `-d`/`-v` pick the level explicitly; otherwise `RUST_LOG` is honoured,
/// falling back to warnings only.
fn init_logging(args: &Args) {
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main URL checking logic
async fn run_url_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let file_config = load_file_config(&args, &env_config)?;
    let defaults = file_config.defaults.unwrap_or_default();

    let config = build_config(&args, &defaults, &env_config);
    let file = resolve_target_file(&args, &env_config, &defaults);

    tracing::info!(file = %file, ?config, "starting run");

    // Nothing touches the network before the list has been read.
    let urls = load_targets(&file)?;

    if urls.is_empty() {
        println!("No URLs found in {}", file);
        return Ok(());
    }

    ui::print_header(urls.len(), config.timeout);

    let checker = UrlChecker::with_config(config)?;
    let start_time = Instant::now();
    let mut stats = RunStats::default();

    let mut stream = checker.check_urls_stream(&urls);
    while let Some(result) = stream.next().await {
        ui::print_result(&result);
        stats.record(&result);
    }

    if args.summary {
        println!();
        ui::print_summary(&stats.format_summary(start_time.elapsed()), stats.failed() > 0);
    }

    Ok(())
}

/// Load the config file layer.
///
/// An explicit file (`--config`, then `UC_CONFIG`) must load; otherwise the
/// standard locations are searched and a failure there just means defaults.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let explicit = args.config.as_ref().or(env_config.config.as_ref());
    if let Some(path) = explicit {
        tracing::info!(path = %path, "using explicit config file");
        let file_config = config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        return Ok(file_config);
    }

    match config_manager.discover_and_load() {
        Ok(file_config) => Ok(file_config),
        Err(e) => {
            tracing::warn!(error = %e, "config discovery failed, using defaults");
            Ok(FileConfig::default())
        }
    }
}

/// Build CheckConfig from all sources.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (UC_*)
/// 3. Config files
/// 4. Built-in defaults
fn build_config(args: &Args, defaults: &DefaultsConfig, env_config: &EnvConfig) -> CheckConfig {
    let config = merge_file_config_into_check_config(CheckConfig::default(), defaults);
    let config = apply_environment_config(config, env_config);
    apply_cli_args_to_config(config, args)
}

fn merge_file_config_into_check_config(
    mut config: CheckConfig,
    defaults: &DefaultsConfig,
) -> CheckConfig {
    if let Some(timeout) = defaults.timeout_duration() {
        config.timeout = timeout;
    }
    if let Some(concurrency) = defaults.concurrency {
        config = config.with_concurrency(Some(concurrency));
    }
    if let Some(read_body) = defaults.read_body {
        config.read_body = read_body;
    }
    if let Some(user_agent) = &defaults.user_agent {
        config.user_agent = user_agent.clone();
    }
    config
}

fn apply_environment_config(mut config: CheckConfig, env_config: &EnvConfig) -> CheckConfig {
    if let Some(timeout) = env_config.timeout {
        config.timeout = timeout;
    }
    if let Some(concurrency) = env_config.concurrency {
        config = config.with_concurrency(Some(concurrency));
    }
    if let Some(read_body) = env_config.read_body {
        config.read_body = read_body;
    }
    if let Some(user_agent) = &env_config.user_agent {
        config.user_agent = user_agent.clone();
    }
    config
}

fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(Some(concurrency));
    }
    // Only an explicit --no-body overrides; the flag's default must not clobber config/env.
    if args.no_body {
        config.read_body = false;
    }
    config
}

/// Pick the target list: CLI > UC_FILE > config file > urls.txt
fn resolve_target_file(args: &Args, env_config: &EnvConfig, defaults: &DefaultsConfig) -> String {
    args.file
        .clone()
        .or_else(|| env_config.file.clone())
        .or_else(|| defaults.file.clone())
        .unwrap_or_else(|| DEFAULT_FILE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url_check_lib::FailureKind;

    fn create_test_args() -> Args {
        Args {
            file: None,
            timeout: None,
            concurrency: None,
            no_body: false,
            summary: false,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    #[test]
    fn test_args_parse_flags() {
        let args = Args::try_parse_from([
            "url-check",
            "list.txt",
            "-t",
            "750ms",
            "-c",
            "4",
            "--no-body",
            "--summary",
        ])
        .unwrap();

        assert_eq!(args.file.as_deref(), Some("list.txt"));
        assert_eq!(args.timeout, Some(Duration::from_millis(750)));
        assert_eq!(args.concurrency, Some(4));
        assert!(args.no_body);
        assert!(args.summary);
    }

    #[test]
    fn test_args_reject_bad_timeout() {
        let result = Args::try_parse_from(["url-check", "-t", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_args() {
        let args = create_test_args();
        assert!(validate_args(&args).is_ok());

        let mut args = create_test_args();
        args.concurrency = Some(0);
        assert!(validate_args(&args).unwrap_err().contains("Concurrency"));

        let mut args = create_test_args();
        args.timeout = Some(Duration::ZERO);
        assert!(validate_args(&args).unwrap_err().contains("Timeout"));
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(
            &create_test_args(),
            &DefaultsConfig::default(),
            &EnvConfig::default(),
        );
        assert_eq!(config, CheckConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_build_config_precedence() {
        let defaults = DefaultsConfig {
            timeout: Some("30s".to_string()),
            concurrency: Some(5),
            read_body: Some(true),
            user_agent: Some("from-file".to_string()),
            file: None,
        };
        let env_config = EnvConfig {
            timeout: Some(Duration::from_secs(20)),
            user_agent: Some("from-env".to_string()),
            ..Default::default()
        };
        let mut args = create_test_args();
        args.timeout = Some(Duration::from_secs(3));

        let config = build_config(&args, &defaults, &env_config);

        assert_eq!(config.timeout, Duration::from_secs(3)); // CLI wins
        assert_eq!(config.user_agent, "from-env"); // env beats file
        assert_eq!(config.concurrency, Some(5)); // file fills the rest
        assert!(config.read_body);
    }

    #[test]
    fn test_no_body_flag_only_disables() {
        let env_config = EnvConfig {
            read_body: Some(false),
            ..Default::default()
        };

        // Flag absent: env setting preserved
        let config = build_config(&create_test_args(), &DefaultsConfig::default(), &env_config);
        assert!(!config.read_body);

        // Flag present: always disabled
        let mut args = create_test_args();
        args.no_body = true;
        let config = build_config(&args, &DefaultsConfig::default(), &EnvConfig::default());
        assert!(!config.read_body);
    }

    #[test]
    fn test_resolve_target_file() {
        let mut defaults = DefaultsConfig::default();
        let mut env_config = EnvConfig::default();
        let mut args = create_test_args();

        assert_eq!(resolve_target_file(&args, &env_config, &defaults), "urls.txt");

        defaults.file = Some("file.txt".to_string());
        assert_eq!(resolve_target_file(&args, &env_config, &defaults), "file.txt");

        env_config.file = Some("env.txt".to_string());
        assert_eq!(resolve_target_file(&args, &env_config, &defaults), "env.txt");

        args.file = Some("cli.txt".to_string());
        assert_eq!(resolve_target_file(&args, &env_config, &defaults), "cli.txt");
    }

    #[test]
    fn test_run_stats_summary() {
        let mut stats = RunStats::default();
        stats.record(&ProbeResult::Success {
            status: 500,
            url: "http://a.test".to_string(),
            elapsed: Duration::from_millis(5),
            size: Some(0),
        });
        for _ in 0..2 {
            stats.record(&ProbeResult::Failure {
                url: "http://b.test".to_string(),
                elapsed: Duration::from_millis(5),
                kind: FailureKind::Timeout,
                error: "timed out".to_string(),
            });
        }
        stats.record(&ProbeResult::Failure {
            url: "http://c.test".to_string(),
            elapsed: Duration::from_millis(5),
            kind: FailureKind::Connect,
            error: "refused".to_string(),
        });

        assert_eq!(stats.total(), 4);
        assert_eq!(stats.failed(), 3);

        let summary = stats.format_summary(Duration::from_millis(1500));
        assert!(summary.starts_with("Summary: 4 checked, 1 responded, 3 failed in 1.50s"));
        assert!(summary.ends_with("(1 connect, 2 timeout)"));
    }

    #[test]
    fn test_run_stats_summary_without_failures() {
        let stats = RunStats::default();
        assert_eq!(
            stats.format_summary(Duration::from_secs(1)),
            "Summary: 0 checked, 0 responded, 0 failed in 1.00s"
        );
    }
}
