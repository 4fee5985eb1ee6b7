//! SupervisorActor - owns the worker pool and aggregates its deliveries.
//!
//! All session state lives in this one task. Deliveries from every worker
//! arrive on the pool's channel and are handled strictly one at a time:
//!
//! 1. Record the value in the worker's history and the global maximum
//! 2. Await the sink (the downstream acknowledgement)
//! 3. Reopen that worker's gate
//!
//! Control requests and visibility changes are interleaved with deliveries in
//! the same loop, so nothing here needs a lock. A slow sink never holds the
//! loop hostage: while an acknowledgement is pending, snapshots are still
//! answered, and cancellation, stop/start/shutdown, or a hidden environment
//! abandon the pending delivery and take effect immediately.

use std::sync::Arc;

use primescan_core::ConfigError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::{
  handle::{SendError, SupervisorHandle},
  lifecycle::visibility::{Visibility, VisibilitySubscription},
  message::{Delivery, SupervisorRequest},
  pipeline::{PoolError, WorkerPool},
};
use crate::{
  domain::{config::SearchSettings, session::SessionState},
  sink::DeliverySink,
};

/// Capacity of the request channel
const REQUEST_BUFFER: usize = 32;

/// One wake-up of the supervisor loop
#[derive(Debug)]
enum Event {
  Cancelled,
  Request(Option<SupervisorRequest>),
  Visibility(Option<Visibility>),
  Delivery(Option<Delivery>),
}

pub struct SupervisorActor {
  requests: mpsc::Receiver<SupervisorRequest>,
  sink: Arc<dyn DeliverySink>,
  visibility: Option<VisibilitySubscription>,
  cancel: CancellationToken,
  pool: Option<WorkerPool>,
  state: SessionState,
}

impl SupervisorActor {
  /// Spawn the supervisor on the current runtime and return its handle.
  ///
  /// The visibility subscription is held for the actor's lifetime; a hidden
  /// environment stops the running pool. Cancelling `cancel` stops the pool
  /// and ends the actor.
  pub fn spawn(
    sink: Arc<dyn DeliverySink>,
    visibility: Option<VisibilitySubscription>,
    cancel: CancellationToken,
  ) -> SupervisorHandle {
    let (tx, requests) = mpsc::channel(REQUEST_BUFFER);
    let actor = Self {
      requests,
      sink,
      visibility,
      cancel,
      pool: None,
      state: SessionState::default(),
    };
    tokio::spawn(actor.run());
    SupervisorHandle::new(tx)
  }

  async fn run(mut self) {
    debug!("Supervisor started");

    // Set when a pending delivery was cut short by another event
    let mut preempted = None;

    loop {
      let event = match preempted.take() {
        Some(event) => event,
        None => self.next_event().await,
      };

      match event {
        Event::Cancelled => {
          debug!("Supervisor cancelled");
          break;
        }
        Event::Request(Some(SupervisorRequest::Shutdown) | None) => break,
        Event::Request(Some(request)) => self.handle_request(request).await,
        Event::Visibility(Some(visibility)) => self.handle_visibility(visibility).await,
        Event::Visibility(None) => self.unsubscribe(),
        Event::Delivery(Some(delivery)) => preempted = self.handle_delivery(delivery).await,
        Event::Delivery(None) => {
          info!("All search workers finished");
          self.stop().await;
        }
      }
    }

    self.stop().await;
    // Unsubscribe before the task ends
    self.visibility = None;
    debug!("Supervisor stopped");
  }

  async fn next_event(&mut self) -> Event {
    tokio::select! {
        biased;

        _ = self.cancel.cancelled() => Event::Cancelled,
        request = self.requests.recv() => Event::Request(request),
        visibility = next_visibility(&mut self.visibility) => Event::Visibility(visibility),
        delivery = next_delivery(&mut self.pool) => Event::Delivery(delivery),
    }
  }

  async fn handle_request(&mut self, request: SupervisorRequest) {
    match request {
      SupervisorRequest::Start { settings, reply } => {
        let result = self.start(settings).await;
        let _ = reply.send(result);
      }
      SupervisorRequest::Stop { reply } => {
        self.stop().await;
        let _ = reply.send(());
      }
      SupervisorRequest::Snapshot { reply } => {
        let _ = reply.send(self.state.snapshot(self.pool.is_some()));
      }
      SupervisorRequest::Shutdown => {}
    }
  }

  async fn handle_visibility(&mut self, visibility: Visibility) {
    match visibility {
      Visibility::Hidden if self.pool.is_some() => {
        info!("Environment hidden, stopping search");
        self.stop().await;
      }
      _ => trace!(?visibility, "Visibility change ignored"),
    }
  }

  fn unsubscribe(&mut self) {
    debug!("Visibility publisher gone, unsubscribing");
    self.visibility = None;
  }

  /// Record a delivery and wait for the sink before reopening the worker's gate.
  ///
  /// Returns the event that cut the wait short, if any. The gate is reopened
  /// either way, so an abandoned delivery never silences its worker.
  async fn handle_delivery(&mut self, delivery: Delivery) -> Option<Event> {
    trace!(worker = delivery.worker, value = delivery.value, "Delivery received");
    self.state.record(delivery.worker, delivery.value);

    let preempted = {
      let acknowledged = self.sink.deliver(&delivery, &self.state);
      tokio::pin!(acknowledged);

      loop {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => break Some(Event::Cancelled),

            request = self.requests.recv() => match request {
                // Answered in place, the delivery keeps waiting
                Some(SupervisorRequest::Snapshot { reply }) => {
                    let _ = reply.send(self.state.snapshot(self.pool.is_some()));
                }
                request => break Some(Event::Request(request)),
            },

            visibility = next_visibility(&mut self.visibility) => match visibility {
                Some(Visibility::Hidden) => break Some(Event::Visibility(Some(Visibility::Hidden))),
                Some(Visibility::Visible) => {}
                None => {
                    debug!("Visibility publisher gone, unsubscribing");
                    self.visibility = None;
                }
            },

            () = &mut acknowledged => break None,
        }
      }
    };

    if preempted.is_some() {
      debug!(worker = delivery.worker, "Pending delivery abandoned");
    }
    if let Some(gate) = self.pool.as_ref().and_then(|pool| pool.gate(delivery.worker)) {
      gate.open();
    }
    preempted
  }

  /// Replace any running session with a fresh one.
  async fn start(&mut self, settings: SearchSettings) -> Result<(), SupervisorError> {
    // Rejected settings leave the current session untouched
    let settings = SearchSettings::new(settings.range_size, settings.history_length, settings.parallelism)?;

    self.stop().await;
    self.state = SessionState::new(settings.parallelism, settings.history_length);

    let pool = WorkerPool::spawn(&settings, self.cancel.child_token()).await?;
    info!(
      workers = settings.parallelism,
      range_size = settings.range_size,
      history_length = settings.history_length,
      "Search started"
    );
    self.pool = Some(pool);
    Ok(())
  }

  /// Cancel and join the running pool, if any.
  async fn stop(&mut self) {
    let Some(pool) = self.pool.take() else {
      return;
    };
    let exits = pool.shutdown().await;
    info!(
      workers = exits.len(),
      global_maximum = self.state.global_maximum(),
      deliveries = self.state.deliveries(),
      "Search stopped"
    );
  }
}

async fn next_delivery(pool: &mut Option<WorkerPool>) -> Option<Delivery> {
  match pool {
    Some(pool) => pool.recv().await,
    None => std::future::pending().await,
  }
}

async fn next_visibility(subscription: &mut Option<VisibilitySubscription>) -> Option<Visibility> {
  match subscription {
    Some(subscription) => subscription.changed().await,
    None => std::future::pending().await,
  }
}

/// Errors returned to callers of the supervisor
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
  #[error("Invalid search settings: {0}")]
  Config(#[from] ConfigError),
  #[error("Failed to start worker pool: {0}")]
  Pool(#[from] PoolError),
  #[error("Supervisor has shut down")]
  ActorGone,
}

impl From<SendError> for SupervisorError {
  fn from(_: SendError) -> Self {
    Self::ActorGone
  }
}
