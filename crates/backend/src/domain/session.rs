//! Aggregated state of one search session.
//!
//! Owned exclusively by the supervisor actor. Workers never see it; they only
//! hand values over through their delivery gate and the pool channel.

use serde::Serialize;

use super::history::History;

/// Value the global maximum is reset to at the start of every session
pub const GLOBAL_MAXIMUM_FLOOR: u64 = 2;

/// Per-worker histories plus the running maximum across all workers.
#[derive(Debug, Clone)]
pub struct SessionState {
  histories: Vec<History>,
  global_maximum: u64,
  deliveries: u64,
}

impl SessionState {
  /// Create empty state for `workers` workers keeping `history_length` values each.
  pub fn new(workers: usize, history_length: usize) -> Self {
    Self {
      histories: (0..workers).map(|_| History::new(history_length)).collect(),
      global_maximum: GLOBAL_MAXIMUM_FLOOR,
      deliveries: 0,
    }
  }

  /// Record a delivered value for a worker.
  ///
  /// Delivery order across workers says nothing about numeric order, so the
  /// maximum is always computed by comparison. Returns false for an unknown
  /// worker index, leaving the state untouched.
  pub fn record(&mut self, worker: usize, value: u64) -> bool {
    let Some(history) = self.histories.get_mut(worker) else {
      return false;
    };
    history.push(value);
    self.global_maximum = self.global_maximum.max(value);
    self.deliveries += 1;
    true
  }

  pub fn history(&self, worker: usize) -> Option<&History> {
    self.histories.get(worker)
  }

  pub fn global_maximum(&self) -> u64 {
    self.global_maximum
  }

  /// Total number of deliveries recorded this session
  pub fn deliveries(&self) -> u64 {
    self.deliveries
  }

  pub fn worker_count(&self) -> usize {
    self.histories.len()
  }

  /// Capture a serializable view of the state.
  pub fn snapshot(&self, running: bool) -> SessionSnapshot {
    SessionSnapshot {
      running,
      global_maximum: self.global_maximum,
      deliveries: self.deliveries,
      workers: self
        .histories
        .iter()
        .enumerate()
        .map(|(index, history)| WorkerSnapshot {
          index,
          primes: history.to_vec(),
        })
        .collect(),
    }
  }
}

impl Default for SessionState {
  fn default() -> Self {
    Self::new(0, 0)
  }
}

/// Point-in-time view of a session, suitable for rendering or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
  pub running: bool,
  pub global_maximum: u64,
  pub deliveries: u64,
  pub workers: Vec<WorkerSnapshot>,
}

impl SessionSnapshot {
  /// Workers that have delivered at least one prime
  pub fn non_empty_workers(&self) -> impl Iterator<Item = &WorkerSnapshot> {
    self.workers.iter().filter(|w| !w.primes.is_empty())
  }
}

/// One worker's recent primes, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSnapshot {
  pub index: usize,
  pub primes: Vec<u64>,
}
