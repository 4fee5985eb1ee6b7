//! Parallel search pipeline
//!
//! A fixed pool of workers scanning disjoint sub-ranges of the integers:
//!
//! ```text
//!              WorkCursor (fetch-and-add)
//!           ┌───────────┼───────────┐
//!       worker 0     worker 1  …  worker P-1
//!           │ gate 0     │ gate 1     │ gate P-1
//!           └───────────┼───────────┘
//!                  Delivery channel → Supervisor
//! ```
//!
//! The cursor and the per-worker gates are the only memory shared between
//! threads. Each gate limits its worker to one delivery in flight, so the
//! channel never holds more than P items.

mod cursor;
mod gate;
mod worker;

use std::{
  io,
  sync::Arc,
  thread::{self, JoinHandle},
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use self::{
  cursor::WorkCursor,
  gate::{DeliveryGate, GateState},
  worker::{CANCEL_CHECK_INTERVAL, ScanOutcome, SearchWorker, WorkerExit, WorkerStats, scan_range},
};
use crate::{actor::message::Delivery, domain::config::SearchSettings};

/// A running set of search workers and the shared state they coordinate through.
#[derive(Debug)]
pub struct WorkerPool {
  workers: Vec<JoinHandle<WorkerExit>>,
  gates: Vec<Arc<DeliveryGate>>,
  cursor: Arc<WorkCursor>,
  cancel: CancellationToken,
  deliveries: mpsc::UnboundedReceiver<Delivery>,
}

impl WorkerPool {
  /// Spawn `settings.parallelism` workers on dedicated threads.
  ///
  /// All-or-nothing: if any thread fails to spawn, the workers already
  /// running are cancelled and joined before the error is returned. Spawning
  /// and any rollback join run on the blocking thread pool.
  pub async fn spawn(settings: &SearchSettings, cancel: CancellationToken) -> Result<Self, PoolError> {
    Self::spawn_offloaded(*settings, cancel, spawn_thread).await
  }

  /// [`WorkerPool::spawn_with`] on the blocking thread pool
  pub(crate) async fn spawn_offloaded<F>(
    settings: SearchSettings,
    cancel: CancellationToken,
    spawner: F,
  ) -> Result<Self, PoolError>
  where
    F: FnMut(SearchWorker) -> io::Result<JoinHandle<WorkerExit>> + Send + 'static,
  {
    tokio::task::spawn_blocking(move || Self::spawn_with(&settings, cancel, spawner)).await?
  }

  /// Spawn with a custom thread spawner.
  pub fn spawn_with<F>(settings: &SearchSettings, cancel: CancellationToken, mut spawner: F) -> Result<Self, PoolError>
  where
    F: FnMut(SearchWorker) -> io::Result<JoinHandle<WorkerExit>>,
  {
    let cursor = Arc::new(WorkCursor::new(0));
    let gates: Vec<Arc<DeliveryGate>> = (0..settings.parallelism)
      .map(|_| Arc::new(DeliveryGate::new()))
      .collect();
    let (tx, deliveries) = mpsc::unbounded_channel();
    let mut workers = Vec::with_capacity(settings.parallelism);

    for (index, gate) in gates.iter().enumerate() {
      // Seeds come from the fresh cursor, so worker i starts at i * R and later
      // claims continue after the seeded territory.
      let Some(seed) = cursor.claim(settings.range_size) else {
        rollback(&cancel, workers);
        return Err(PoolError::SearchSpaceExhausted);
      };

      let worker = SearchWorker {
        index,
        seed,
        range_size: settings.range_size,
        cursor: Arc::clone(&cursor),
        gate: Arc::clone(gate),
        tx: tx.clone(),
        cancel: cancel.clone(),
      };

      match spawner(worker) {
        Ok(handle) => workers.push(handle),
        Err(source) => {
          warn!(worker = index, error = %source, "Failed to spawn search worker, rolling back pool");
          rollback(&cancel, workers);
          return Err(PoolError::Spawn { worker: index, source });
        }
      }
    }
    drop(tx);

    debug!(
      workers = workers.len(),
      range_size = settings.range_size,
      "Worker pool spawned"
    );

    Ok(Self {
      workers,
      gates,
      cursor,
      cancel,
      deliveries,
    })
  }

  /// Receive the next delivery.
  ///
  /// Returns `None` once every worker has exited and the channel is drained.
  pub async fn recv(&mut self) -> Option<Delivery> {
    self.deliveries.recv().await
  }

  /// The delivery gate of one worker
  pub fn gate(&self, worker: usize) -> Option<&DeliveryGate> {
    self.gates.get(worker).map(|g| g.as_ref())
  }

  pub fn worker_count(&self) -> usize {
    self.workers.len()
  }

  /// Start of the next unclaimed sub-range
  pub fn cursor_position(&self) -> u64 {
    self.cursor.position()
  }

  /// Cancel every worker and wait for all of them to exit.
  ///
  /// Joining blocks for at most one cancellation-check interval per worker,
  /// so it runs on the blocking thread pool.
  pub async fn shutdown(mut self) -> Vec<WorkerExit> {
    self.cancel.cancel();
    self.deliveries.close();

    let workers = std::mem::take(&mut self.workers);
    match tokio::task::spawn_blocking(move || join_all(workers)).await {
      Ok(exits) => {
        debug!(workers = exits.len(), "Worker pool shut down");
        exits
      }
      Err(e) => {
        warn!(error = %e, "Failed to join worker pool");
        Vec::new()
      }
    }
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    // Dropping without shutdown still signals the workers; the threads are detached.
    self.cancel.cancel();
  }
}

fn spawn_thread(worker: SearchWorker) -> io::Result<JoinHandle<WorkerExit>> {
  thread::Builder::new()
    .name(format!("primescan-worker-{}", worker.index))
    .spawn(move || worker.run())
}

fn rollback(cancel: &CancellationToken, workers: Vec<JoinHandle<WorkerExit>>) {
  cancel.cancel();
  let exits = join_all(workers);
  debug!(rolled_back = exits.len(), "Partially spawned pool rolled back");
}

fn join_all(workers: Vec<JoinHandle<WorkerExit>>) -> Vec<WorkerExit> {
  workers
    .into_iter()
    .filter_map(|handle| match handle.join() {
      Ok(exit) => Some(exit),
      Err(_) => {
        warn!("Search worker panicked");
        None
      }
    })
    .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
  #[error("Failed to spawn search worker {worker}: {source}")]
  Spawn {
    worker: usize,
    #[source]
    source: io::Error,
  },
  #[error("Seed ranges exceed the searchable space")]
  SearchSpaceExhausted,
  #[error("Worker pool spawn task failed: {0}")]
  SpawnTask(#[from] tokio::task::JoinError),
}
