//! Search runtime - wires the supervisor to process signals and a run deadline.
//!
//! # Lifecycle
//!
//! 1. Spawn the `SupervisorActor` with a visibility subscription
//! 2. Start the first session
//! 3. Forward ctrl-c (and on unix, SIGUSR1/SIGUSR2 as hidden/visible)
//! 4. Restart the session when the environment becomes visible again
//! 5. On ctrl-c or deadline: stop, take the final snapshot, shut the supervisor down

use std::{sync::Arc, time::Duration};

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
  actor::{
    SupervisorActor, SupervisorError,
    handle::SupervisorHandle,
    lifecycle::visibility::{Visibility, VisibilitySignal},
  },
  domain::{config::SearchSettings, session::SessionSnapshot},
  sink::DeliverySink,
};

/// Runtime configuration for one search run.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
  pub settings: SearchSettings,
  /// Stop after this long. `None` runs until ctrl-c.
  pub duration: Option<Duration>,
  /// Map SIGUSR1/SIGUSR2 to hidden/visible
  pub handle_signals: bool,
}

impl RuntimeConfig {
  pub fn new(settings: SearchSettings) -> Self {
    Self {
      settings,
      duration: None,
      handle_signals: true,
    }
  }
}

pub struct Runtime {
  config: RuntimeConfig,
  cancel: CancellationToken,
  visibility: VisibilitySignal,
}

impl Runtime {
  pub fn new(config: RuntimeConfig) -> Self {
    Self {
      config,
      cancel: CancellationToken::new(),
      visibility: VisibilitySignal::new(),
    }
  }

  /// Token that ends the run when cancelled
  pub fn cancel_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  /// Publisher for foreground/background changes
  pub fn visibility(&self) -> VisibilitySignal {
    self.visibility.clone()
  }

  /// Run the search until cancelled or the configured duration elapses.
  ///
  /// Returns the session state as it stood when the search was stopped.
  pub async fn run(self, sink: Arc<dyn DeliverySink>) -> Result<SessionSnapshot, SupervisorError> {
    let settings = self.config.settings;
    // The supervisor outlives the run token so the final snapshot can still be taken
    let supervisor_cancel = CancellationToken::new();
    let supervisor = SupervisorActor::spawn(sink, Some(self.visibility.subscribe()), supervisor_cancel.clone());

    if let Err(e) = supervisor.start(settings).await {
      supervisor_cancel.cancel();
      return Err(e);
    }

    spawn_ctrl_c(self.cancel.clone());
    if self.config.handle_signals {
      spawn_visibility_signals(self.visibility.clone(), self.cancel.clone());
    }

    let duration = self.config.duration;
    let deadline = async move {
      match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
      }
    };
    tokio::pin!(deadline);

    let mut changes = self.visibility.subscribe();
    loop {
      tokio::select! {
          biased;

          _ = self.cancel.cancelled() => {
              info!("Search interrupted");
              break;
          }

          _ = &mut deadline => {
              info!("Run duration elapsed");
              break;
          }

          Some(visibility) = changes.changed() => {
              if visibility == Visibility::Visible {
                  restart_if_stopped(&supervisor, settings).await?;
              }
          }
      }
    }

    supervisor.stop().await?;
    let snapshot = supervisor.snapshot().await?;
    supervisor.shutdown().await?;
    self.cancel.cancel();

    debug!(deliveries = snapshot.deliveries, "Runtime finished");
    Ok(snapshot)
  }
}

async fn restart_if_stopped(supervisor: &SupervisorHandle, settings: SearchSettings) -> Result<(), SupervisorError> {
  if supervisor.snapshot().await?.running {
    return Ok(());
  }
  info!("Environment visible, restarting search");
  supervisor.start(settings).await
}

fn spawn_ctrl_c(cancel: CancellationToken) {
  tokio::spawn(async move {
    tokio::select! {
        _ = cancel.cancelled() => {}
        result = signal::ctrl_c() => match result {
            Ok(()) => {
                info!("Received ctrl-c, stopping search...");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for ctrl-c: {}", e),
        },
    }
  });
}

#[cfg(unix)]
fn spawn_visibility_signals(visibility: VisibilitySignal, cancel: CancellationToken) {
  use tokio::signal::unix::{SignalKind, signal};

  let (mut hide, mut show) = match (signal(SignalKind::user_defined1()), signal(SignalKind::user_defined2())) {
    (Ok(hide), Ok(show)) => (hide, show),
    (Err(e), _) | (_, Err(e)) => {
      warn!("Failed to install visibility signal handlers: {}", e);
      return;
    }
  };

  tokio::spawn(async move {
    loop {
      tokio::select! {
          _ = cancel.cancelled() => break,
          Some(()) = hide.recv() => visibility.set(Visibility::Hidden),
          Some(()) = show.recv() => visibility.set(Visibility::Visible),
          else => break,
      }
    }
  });
}

#[cfg(not(unix))]
fn spawn_visibility_signals(_visibility: VisibilitySignal, _cancel: CancellationToken) {
  debug!("Visibility signals are only available on unix");
}
