//! `primescan run` - drive a search session from the terminal

use std::{
  io::Write,
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use primescan::{
  Delivery, Runtime, RuntimeConfig, SessionState,
  config::{Config, SearchConfig, SearchSettings},
  sink::{DeliverySink, NullSink},
};
use tracing::info;

use crate::format::{format_delivery, format_snapshot};

/// Command-line overrides for a run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
  pub range: Option<u64>,
  pub history: Option<usize>,
  pub workers: Option<usize>,
  pub duration: Option<u64>,
  pub json: bool,
  pub quiet: bool,
}

impl RunOptions {
  /// Apply flags on top of the file config and validate the result
  fn settings(&self, config: &SearchConfig) -> Result<SearchSettings> {
    let mut search = config.clone();
    if let Some(range) = self.range {
      search.range_size = range;
    }
    if let Some(history) = self.history {
      search.history_length = history;
    }
    if let Some(workers) = self.workers {
      search.parallelism = Some(workers);
    }
    search.validate().context("Invalid search settings")
  }
}

/// Renders each delivery as one line on stdout.
///
/// The write finishes before `deliver` returns, so the terminal's pace is
/// the delivery rate.
struct TerminalSink;

#[async_trait::async_trait]
impl DeliverySink for TerminalSink {
  async fn deliver(&self, delivery: &Delivery, state: &SessionState) {
    let line = format_delivery(delivery, state);
    {
      let mut stdout = std::io::stdout().lock();
      // A closed pipe only loses the rendering
      let _ = writeln!(stdout, "{}", line);
    }
    tokio::task::yield_now().await;
  }
}

pub async fn cmd_run(config: &Config, options: RunOptions) -> Result<()> {
  let settings = options.settings(&config.search)?;

  let runtime = Runtime::new(RuntimeConfig {
    settings,
    duration: options.duration.map(Duration::from_secs),
    handle_signals: true,
  });

  info!(
    pid = std::process::id(),
    workers = settings.parallelism,
    range_size = settings.range_size,
    history_length = settings.history_length,
    "Starting search (ctrl-c to stop)"
  );

  let sink: Arc<dyn DeliverySink> = if options.quiet || options.json {
    Arc::new(NullSink)
  } else {
    Arc::new(TerminalSink)
  };

  let snapshot = runtime.run(sink).await?;

  if options.json {
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
  } else {
    if !options.quiet {
      println!();
    }
    print!("{}", format_snapshot(&snapshot));
  }

  Ok(())
}
