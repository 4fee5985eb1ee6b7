//! CLI command implementations

mod check;
mod config;
mod run;

use std::path::Path;

use anyhow::{Context, Result};
use primescan_core::Config;

pub use check::cmd_check;
pub use config::{cmd_config_init, cmd_config_show};
pub use run::{RunOptions, cmd_run};

/// Load the effective configuration: an explicit file, or the project/user lookup.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
  match explicit {
    Some(path) => Ok(Config::load_from(path)?),
    None => {
      let cwd = std::env::current_dir().context("Failed to read current directory")?;
      Ok(Config::load_for_project(&cwd)?)
    }
  }
}
