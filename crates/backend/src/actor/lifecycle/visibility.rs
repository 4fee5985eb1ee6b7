//! Environment visibility tracking.
//!
//! The host publishes whether its results can currently be observed. The
//! supervisor subscribes when it is constructed and stops the search when the
//! environment becomes hidden, so no CPU is spent on results nobody sees. The
//! subscription ends when the supervisor drops it at teardown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Whether the host environment is currently observable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  #[default]
  Visible,
  Hidden,
}

/// Publisher side of the visibility signal, owned by the host.
///
/// Cheap to clone; all clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct VisibilitySignal {
  tx: Arc<watch::Sender<Visibility>>,
}

impl VisibilitySignal {
  /// Create a signal in the visible state.
  pub fn new() -> Self {
    let (tx, _) = watch::channel(Visibility::Visible);
    Self { tx: Arc::new(tx) }
  }

  /// Publish a new visibility state. Works with or without subscribers.
  pub fn set(&self, visibility: Visibility) {
    let previous = self.tx.send_replace(visibility);
    debug!(?previous, current = ?visibility, "Visibility changed");
  }

  pub fn current(&self) -> Visibility {
    *self.tx.borrow()
  }

  /// Register a new observer.
  pub fn subscribe(&self) -> VisibilitySubscription {
    VisibilitySubscription {
      rx: self.tx.subscribe(),
    }
  }

  /// Number of live subscriptions
  pub fn subscriber_count(&self) -> usize {
    self.tx.receiver_count()
  }
}

impl Default for VisibilitySignal {
  fn default() -> Self {
    Self::new()
  }
}

/// Observer side of the visibility signal. Dropping it unsubscribes.
#[derive(Debug)]
pub struct VisibilitySubscription {
  rx: watch::Receiver<Visibility>,
}

impl VisibilitySubscription {
  /// Wait for the next published state.
  ///
  /// Returns `None` once every publisher is gone.
  pub async fn changed(&mut self) -> Option<Visibility> {
    self.rx.changed().await.ok()?;
    Some(*self.rx.borrow_and_update())
  }

  pub fn current(&self) -> Visibility {
    *self.rx.borrow()
  }
}
