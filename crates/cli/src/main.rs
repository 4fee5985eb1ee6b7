//! primescan CLI - parallel prime search with bounded, lossy delivery

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod format;
mod logging;

use commands::{RunOptions, cmd_check, cmd_config_init, cmd_config_show, cmd_run, load_config};
use logging::{init_cli_logging, init_logging};

#[derive(Parser)]
#[command(name = "primescan")]
#[command(about = "Search the integers for primes across parallel workers")]
#[command(after_help = "\
QUICK START:
  primescan run                   # Search until ctrl-c
  primescan run --duration 10     # Search for ten seconds
  primescan check 97 1009         # Test individual numbers
  primescan config init           # Write ./.primescan.toml")]
struct Cli {
  /// Config file to use instead of ./.primescan.toml or the user config
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

/// Subcommands for `primescan config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show effective configuration
  Show,
  /// Write the default config template to ./.primescan.toml
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Run a search session
  #[command(after_help = "\
SIGNALS (unix):
  SIGUSR1   Environment hidden: stop the search
  SIGUSR2   Environment visible: start a fresh search
  ctrl-c    Stop and print the final session state

EXAMPLES:
  primescan run --workers 4 --range 10000 --history 5
  primescan run --duration 30 --json > session.json")]
  Run {
    /// Sub-range size each worker claims
    #[arg(short, long, value_name = "R")]
    range: Option<u64>,
    /// Recent primes kept per worker
    #[arg(long, value_name = "H")]
    history: Option<usize>,
    /// Number of parallel workers (default: available hardware threads)
    #[arg(short, long, value_name = "P")]
    workers: Option<usize>,
    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    duration: Option<u64>,
    /// Print the final session state as JSON
    #[arg(long)]
    json: bool,
    /// Do not render individual deliveries
    #[arg(short, long)]
    quiet: bool,
  },
  /// Test whether numbers are prime
  Check {
    /// Numbers to test
    #[arg(required = true)]
    numbers: Vec<u64>,
  },
  /// Manage configuration
  #[command(after_help = "\
CONFIG LOCATIONS:
  Project: ./.primescan.toml
  User:    ~/.config/primescan/config.toml (or $PRIMESCAN_CONFIG_DIR/config.toml)")]
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Run {
      range,
      history,
      workers,
      duration,
      json,
      quiet,
    } => {
      let config = load_config(cli.config.as_deref())?;
      // Keep the file writer alive until the run ends
      let _guard = init_logging(&config.logging);

      let options = RunOptions {
        range,
        history,
        workers,
        duration,
        json,
        quiet,
      };
      cmd_run(&config, options).await
    }
    Commands::Check { numbers } => {
      init_cli_logging();
      cmd_check(&numbers)
    }
    Commands::Config { command } => {
      init_cli_logging();
      match command {
        ConfigCommand::Show => cmd_config_show(cli.config.as_deref()),
        ConfigCommand::Init { force } => cmd_config_init(force),
      }
    }
  }
}
