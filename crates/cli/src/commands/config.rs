//! `primescan config` commands

use std::path::Path;

use anyhow::{Result, bail};
use primescan_core::Config;

use super::load_config;

/// Show the effective configuration and where it came from
pub fn cmd_config_show(explicit: Option<&Path>) -> Result<()> {
  let cwd = std::env::current_dir()?;
  let config = load_config(explicit)?;

  let project_config = Config::project_config_path(&cwd);
  let user_config = Config::user_config_path();

  if let Some(path) = explicit {
    println!("Using config: {:?}", path);
  } else if project_config.exists() {
    println!("Using project config: {:?}", project_config);
  } else if let Some(user_path) = user_config.filter(|p| p.exists()) {
    println!("Using user config: {:?}", user_path);
  } else {
    println!("Using default configuration (no config file found)");
  }
  println!();

  println!("{}", toml::to_string_pretty(&config)?);
  Ok(())
}

/// Write the default template to the project config file
pub fn cmd_config_init(force: bool) -> Result<()> {
  let cwd = std::env::current_dir()?;
  let path = write_template(&cwd, force)?;
  println!("Created project config: {:?}", path);
  println!("Edit the file to customize settings.");
  Ok(())
}

fn write_template(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
  let path = Config::project_config_path(dir);
  if path.exists() && !force {
    bail!("Config file already exists: {:?} (use --force to overwrite)", path);
  }
  std::fs::write(&path, Config::generate_template())?;
  Ok(path)
}
