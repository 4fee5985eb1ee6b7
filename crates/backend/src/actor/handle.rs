//! Actor handles for communicating with actors
//!
//! Handles are cheap to clone and wrap the channel sender with one method per
//! request. Every request carries its own oneshot reply channel.

use tokio::sync::{mpsc, oneshot};

use super::{message::SupervisorRequest, supervisor::SupervisorError};
use crate::domain::{config::SearchSettings, session::SessionSnapshot};

// ============================================================================
// Supervisor Handle
// ============================================================================

/// Handle to communicate with a SupervisorActor
#[derive(Clone, Debug)]
pub struct SupervisorHandle {
  pub tx: mpsc::Sender<SupervisorRequest>,
}

impl SupervisorHandle {
  /// Create a new handle from a sender
  pub fn new(tx: mpsc::Sender<SupervisorRequest>) -> Self {
    Self { tx }
  }

  /// Start a fresh session, replacing any running one.
  ///
  /// Invalid settings are rejected before the running session is touched.
  pub async fn start(&self, settings: SearchSettings) -> Result<(), SupervisorError> {
    let (reply, rx) = oneshot::channel();
    self.send(SupervisorRequest::Start { settings, reply }).await?;
    rx.await.map_err(|_| SupervisorError::ActorGone)?
  }

  /// Stop the running session and wait until every worker has exited.
  pub async fn stop(&self) -> Result<(), SendError> {
    let (reply, rx) = oneshot::channel();
    self.send(SupervisorRequest::Stop { reply }).await?;
    rx.await.map_err(|_| SendError::ActorGone)
  }

  /// Capture the session state as the supervisor currently sees it
  pub async fn snapshot(&self) -> Result<SessionSnapshot, SendError> {
    let (reply, rx) = oneshot::channel();
    self.send(SupervisorRequest::Snapshot { reply }).await?;
    rx.await.map_err(|_| SendError::ActorGone)
  }

  /// Request the supervisor to stop its pool and exit
  pub async fn shutdown(&self) -> Result<(), SendError> {
    self.send(SupervisorRequest::Shutdown).await
  }

  /// True once the supervisor task has exited
  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }

  async fn send(&self, request: SupervisorRequest) -> Result<(), SendError> {
    self.tx.send(request).await.map_err(|_| SendError::ActorGone)
  }
}

// ============================================================================
// Errors
// ============================================================================

/// Error when sending to an actor
#[derive(Debug, Clone, thiserror::Error)]
pub enum SendError {
  #[error("Actor has shut down")]
  ActorGone,
}
