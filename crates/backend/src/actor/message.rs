//! Actor message types for the search supervisor.
//!
//! Workers talk to the supervisor only through [`Delivery`] values on their
//! pool's channel. Control requests come in through [`SupervisorRequest`],
//! each carrying a reply channel.

use tokio::sync::oneshot;

use super::supervisor::SupervisorError;
use crate::domain::{config::SearchSettings, session::SessionSnapshot};

/// A prime handed from a worker to the aggregator after winning its gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
  /// Index of the worker that found the value
  pub worker: usize,
  /// The prime itself
  pub value: u64,
}

/// A request to the supervisor actor
#[derive(Debug)]
pub enum SupervisorRequest {
  /// Stop any running pool, reset the session, and spawn a fresh pool
  Start {
    settings: SearchSettings,
    reply: oneshot::Sender<Result<(), SupervisorError>>,
  },
  /// Cancel and join every worker. No-op when nothing is running.
  Stop { reply: oneshot::Sender<()> },
  /// Capture the current session state
  Snapshot { reply: oneshot::Sender<SessionSnapshot> },
  /// Stop the pool and exit the actor loop
  Shutdown,
}
