//! Configuration system for primescan.
//!
//! Config priority: explicit path > project-relative (.primescan.toml) > user (~/.config/primescan/config.toml)
//! > built-in defaults. Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the project-relative config
pub const PROJECT_CONFIG_FILE: &str = ".primescan.toml";

// ============================================================================
// Search Configuration
// ============================================================================

/// Prime search settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  /// Size of each sub-range a worker claims (default: 1000000)
  pub range_size: u64,

  /// Number of recent primes kept per worker (default: 10)
  pub history_length: usize,

  /// Number of parallel workers.
  /// Uses the host's available parallelism when not set.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parallelism: Option<usize>,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      range_size: 1_000_000,
      history_length: 10,
      parallelism: None,
    }
  }
}

impl SearchConfig {
  /// Validate the config and resolve defaults into runtime settings.
  ///
  /// Zero values are rejected rather than clamped, so a bad config never
  /// reaches the worker pool.
  pub fn validate(&self) -> Result<SearchSettings, ConfigError> {
    if self.range_size == 0 {
      return Err(ConfigError::ZeroRangeSize);
    }
    if self.history_length == 0 {
      return Err(ConfigError::ZeroHistoryLength);
    }
    let parallelism = match self.parallelism {
      Some(0) => return Err(ConfigError::ZeroParallelism),
      Some(n) => n,
      None => num_cpus::get(),
    };

    Ok(SearchSettings {
      range_size: self.range_size,
      history_length: self.history_length,
      parallelism,
    })
  }
}

/// Validated search settings handed to the supervisor at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
  /// Sub-range size R
  pub range_size: u64,
  /// History capacity H per worker
  pub history_length: usize,
  /// Worker count P
  pub parallelism: usize,
}

impl SearchSettings {
  /// Build settings directly, applying the same checks as [`SearchConfig::validate`].
  pub fn new(range_size: u64, history_length: usize, parallelism: usize) -> Result<Self, ConfigError> {
    SearchConfig {
      range_size,
      history_length,
      parallelism: Some(parallelism),
    }
    .validate()
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log file rotation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
  Daily,
  Hourly,
  #[default]
  Never,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: "off", "error", "warn", "info", "debug", "trace"
  /// RUST_LOG overrides this when set.
  pub level: String,

  /// Write logs to this directory instead of stderr
  #[serde(skip_serializing_if = "Option::is_none")]
  pub directory: Option<PathBuf>,

  /// Log file rotation (file logging only)
  pub rotation: LogRotation,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      directory: None,
      rotation: LogRotation::Never,
    }
  }
}

// ============================================================================
// Top-level Config
// ============================================================================

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Prime search settings
  #[serde(default)]
  pub search: SearchConfig,

  /// Logging settings
  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Load config from an explicit file. Missing or malformed files are errors.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load config for a working directory, with fallback to user config and then defaults.
  ///
  /// Files that exist but fail to parse are reported instead of silently skipped.
  pub fn load_for_project(project_path: &Path) -> Result<Self, ConfigError> {
    let project_config = Self::project_config_path(project_path);
    if project_config.exists() {
      return Self::load_from(&project_config);
    }

    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
    {
      return Self::load_from(&user_config_path);
    }

    Ok(Self::default())
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PRIMESCAN_CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("primescan").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("primescan").join("config.toml"))
  }

  /// Get the project-relative config path
  pub fn project_config_path(project_path: &Path) -> PathBuf {
    project_path.join(PROJECT_CONFIG_FILE)
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    let defaults = Self::default();

    format!(
      r#"# primescan configuration
# Place in ./{project_file} (project) or ~/.config/primescan/config.toml (user)

# ============================================================================
# Search
# ============================================================================
[search]
# Size of each sub-range a worker claims from the shared cursor
range_size = {range_size}

# Number of recently delivered primes kept per worker
history_length = {history_length}

# Number of parallel workers (default: available hardware threads)
# parallelism = 8

# ============================================================================
# Logging
# ============================================================================
[logging]
# off, error, warn, info, debug, trace (RUST_LOG overrides)
level = "{level}"

# Write logs to files in this directory instead of stderr
# directory = "/tmp/primescan"

# File rotation: daily, hourly, never
rotation = "never"
"#,
      project_file = PROJECT_CONFIG_FILE,
      range_size = defaults.search.range_size,
      history_length = defaults.search.history_length,
      level = defaults.logging.level,
    )
  }
}
