//! Shared work cursor - hands out sub-ranges of the search space.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

/// Atomic counter that partitions the integers into contiguous sub-ranges.
///
/// Every successful [`claim`](Self::claim) returns the current position and
/// advances it by the range size in one lock-free step, so concurrent callers
/// always receive disjoint ranges. The cursor never moves backwards and is
/// never reset; a new session gets a new cursor.
#[derive(Debug)]
pub struct WorkCursor {
  next: AtomicU64,
}

impl WorkCursor {
  /// Create a cursor whose first claim starts at `initial`.
  pub const fn new(initial: u64) -> Self {
    Self {
      next: AtomicU64::new(initial),
    }
  }

  /// Claim the next sub-range `[start, start + range_size)`, returning `start`.
  ///
  /// Returns `None` once a claim would run past `u64::MAX`. The cursor is left
  /// where it was, so every later claim of the same size is refused too.
  pub fn claim(&self, range_size: u64) -> Option<u64> {
    let claimed = self
      .next
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| current.checked_add(range_size))
      .ok();
    trace!(range_start = ?claimed, range_size, "Claimed sub-range");
    claimed
  }

  /// Start of the next unclaimed sub-range
  pub fn position(&self) -> u64 {
    self.next.load(Ordering::Acquire)
  }
}

impl Default for WorkCursor {
  fn default() -> Self {
    Self::new(0)
  }
}
