//! Search worker - claims sub-ranges, scans them, and delivers primes through its gate.
//!
//! Each worker runs on its own OS thread. It has no natural end: it keeps
//! claiming ranges until cancelled, until the cursor runs out of search space,
//! or until the aggregator drops the delivery channel.

use std::{ops::Range, sync::Arc};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{cursor::WorkCursor, gate::DeliveryGate};
use crate::{actor::message::Delivery, domain::prime::is_prime};

/// Candidates scanned between cancellation checks inside a range
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// How a single range scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
  /// Every candidate in the range was tested
  Completed,
  /// Cancellation was observed mid-range; the rest of the range is abandoned
  Cancelled,
  /// The consumer side is gone
  Disconnected,
}

/// Why a worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
  Cancelled,
  /// The cursor refused further claims
  Exhausted,
  Disconnected,
}

/// Per-worker counters, logged when the worker finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
  pub ranges: u64,
  pub scanned: u64,
  pub found: u64,
  pub delivered: u64,
  /// Primes found while the gate was closed
  pub dropped: u64,
}

/// Scan one range in increasing order, delivering primes through `gate`.
///
/// `emit` is only called after the gate was claimed, and returns false when
/// the consumer is gone. A prime found while the gate is closed is counted and
/// discarded; it is never retried or buffered.
pub fn scan_range(
  range: Range<u64>,
  gate: &DeliveryGate,
  cancel: &CancellationToken,
  stats: &mut WorkerStats,
  mut emit: impl FnMut(u64) -> bool,
) -> ScanOutcome {
  let mut since_check = 0;

  for n in range {
    if since_check == 0 && cancel.is_cancelled() {
      return ScanOutcome::Cancelled;
    }
    since_check = (since_check + 1) % CANCEL_CHECK_INTERVAL;
    stats.scanned += 1;

    if !is_prime(n) {
      continue;
    }
    stats.found += 1;

    if gate.try_close() {
      if !emit(n) {
        return ScanOutcome::Disconnected;
      }
      stats.delivered += 1;
    } else {
      stats.dropped += 1;
    }
  }

  ScanOutcome::Completed
}

/// One member of the worker pool.
#[derive(Debug)]
pub struct SearchWorker {
  pub index: usize,
  /// Start of the first range, handed out by the pool before spawning
  pub seed: u64,
  pub range_size: u64,
  pub cursor: Arc<WorkCursor>,
  pub gate: Arc<DeliveryGate>,
  pub tx: mpsc::UnboundedSender<Delivery>,
  pub cancel: CancellationToken,
}

impl SearchWorker {
  /// Run the scan loop until cancellation, exhaustion, or disconnect.
  pub fn run(self) -> WorkerExit {
    trace!(worker = self.index, seed = self.seed, "Search worker starting");

    let mut stats = WorkerStats::default();
    let mut start = self.seed;

    let exit = loop {
      if self.cancel.is_cancelled() {
        break WorkerExit::Cancelled;
      }

      stats.ranges += 1;
      let end = start.saturating_add(self.range_size);
      let outcome = scan_range(start..end, &self.gate, &self.cancel, &mut stats, |value| {
        trace!(worker = self.index, value, "Delivering prime");
        self
          .tx
          .send(Delivery {
            worker: self.index,
            value,
          })
          .is_ok()
      });

      match outcome {
        ScanOutcome::Completed => {}
        ScanOutcome::Cancelled => break WorkerExit::Cancelled,
        ScanOutcome::Disconnected => break WorkerExit::Disconnected,
      }

      match self.cursor.claim(self.range_size) {
        Some(next) => start = next,
        None => break WorkerExit::Exhausted,
      }
    };

    debug!(
      worker = self.index,
      ?exit,
      ranges = stats.ranges,
      scanned = stats.scanned,
      found = stats.found,
      delivered = stats.delivered,
      dropped = stats.dropped,
      "Search worker finished"
    );
    exit
  }
}
