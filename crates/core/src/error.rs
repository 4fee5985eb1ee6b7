use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("search.range_size must be positive")]
  ZeroRangeSize,

  #[error("search.history_length must be positive")]
  ZeroHistoryLength,

  #[error("search.parallelism must be positive")]
  ZeroParallelism,

  #[error("Failed to read config {path:?}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config {path:?}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
