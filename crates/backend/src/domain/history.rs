//! Bounded per-worker history of delivered primes.

use std::collections::VecDeque;

/// Fixed-capacity FIFO of the most recent values delivered by one worker.
///
/// Pushing into a full history evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
  values: VecDeque<u64>,
  capacity: usize,
}

impl History {
  /// Create an empty history holding at most `capacity` values.
  pub fn new(capacity: usize) -> Self {
    Self {
      values: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Append a value, evicting the oldest one if the history is full.
  ///
  /// Returns the evicted value, if any.
  pub fn push(&mut self, value: u64) -> Option<u64> {
    if self.capacity == 0 {
      return Some(value);
    }
    let evicted = if self.values.len() >= self.capacity {
      self.values.pop_front()
    } else {
      None
    };
    self.values.push_back(value);
    evicted
  }

  pub fn clear(&mut self) {
    self.values.clear();
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Most recently delivered value
  pub fn latest(&self) -> Option<u64> {
    self.values.back().copied()
  }

  /// Values in arrival order, oldest first
  pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
    self.values.iter().copied()
  }

  pub fn to_vec(&self) -> Vec<u64> {
    self.iter().collect()
  }
}
