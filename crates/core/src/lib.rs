pub mod config;
pub mod error;

pub use config::{Config, LogRotation, LoggingConfig, SearchConfig, SearchSettings};
pub use error::ConfigError;
