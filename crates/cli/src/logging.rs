//! Logging setup for CLI commands and search runs

use primescan_core::{LogRotation, LoggingConfig};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// File name prefix for log files
const LOG_FILE: &str = "primescan.log";

/// Initialize logging for short-lived commands (stderr only)
pub fn init_cli_logging() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).from_env_lossy())
    .with_writer(std::io::stderr)
    .init();
}

/// Parse log level from config string
fn parse_log_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => LevelFilter::OFF,
    "error" => LevelFilter::ERROR,
    "warn" => LevelFilter::WARN,
    "info" => LevelFilter::INFO,
    "debug" => LevelFilter::DEBUG,
    "trace" => LevelFilter::TRACE,
    _ => LevelFilter::INFO,
  }
}

/// Initialize logging for a search run with config-driven settings.
///
/// Without `directory`: logs to stderr, so stdout stays free for deliveries and JSON.
/// With `directory`: logs to a rolling file only (no ANSI).
///
/// Returns the guard that must be kept alive for the duration of the program
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
  // RUST_LOG overrides the configured level
  let env_filter = EnvFilter::builder()
    .with_default_directive(parse_log_level(&config.level).into())
    .from_env_lossy();

  let Some(log_dir) = &config.directory else {
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_target(true)
      .with_writer(std::io::stderr)
      .init();
    return None;
  };

  if let Err(e) = std::fs::create_dir_all(log_dir) {
    // Fall back to stderr logging
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_writer(std::io::stderr)
      .init();
    tracing::warn!("Failed to create log directory {:?}: {}", log_dir, e);
    return None;
  }

  let file_appender = match config.rotation {
    LogRotation::Daily => tracing_appender::rolling::daily(log_dir, LOG_FILE),
    LogRotation::Hourly => tracing_appender::rolling::hourly(log_dir, LOG_FILE),
    LogRotation::Never => tracing_appender::rolling::never(log_dir, LOG_FILE),
  };

  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}
