//! Delivery gate - single-slot flow control between one worker and the aggregator.
//!
//! The worker claims the slot with [`DeliveryGate::try_close`] before emitting a
//! prime; the aggregator releases it with [`DeliveryGate::open`] once the value
//! has been fully handled downstream. A worker never waits on the gate: a prime
//! found while the gate is closed is dropped for good. Queued work per worker is
//! therefore bounded to exactly one item, and the consumer's pace alone sets the
//! delivery rate.

use std::sync::atomic::{AtomicBool, Ordering};

/// Observable gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
  /// The worker may deliver its next find
  Open,
  /// A delivery is in flight
  Closed,
}

/// Lock-free two-state gate.
#[derive(Debug)]
pub struct DeliveryGate {
  open: AtomicBool,
}

impl DeliveryGate {
  /// Create a gate in the open state.
  pub const fn new() -> Self {
    Self {
      open: AtomicBool::new(true),
    }
  }

  /// Atomically move the gate from OPEN to CLOSED.
  ///
  /// Returns true if this call claimed the slot, false if it was already closed.
  pub fn try_close(&self) -> bool {
    self
      .open
      .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  /// Reopen the gate. Only the aggregator calls this, after handling a delivery.
  pub fn open(&self) {
    self.open.store(true, Ordering::Release);
  }

  pub fn state(&self) -> GateState {
    if self.open.load(Ordering::Acquire) {
      GateState::Open
    } else {
      GateState::Closed
    }
  }
}

impl Default for DeliveryGate {
  fn default() -> Self {
    Self::new()
  }
}
