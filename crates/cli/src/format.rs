//! Terminal formatting for deliveries and session snapshots.

use std::fmt::Write;

use primescan::{Delivery, SessionSnapshot, SessionState, is_prime};

/// One line per delivery: the worker's recent primes and the global maximum.
pub fn format_delivery(delivery: &Delivery, state: &SessionState) -> String {
  let recent = state
    .history(delivery.worker)
    .map(|history| join(history.iter()))
    .unwrap_or_default();
  format!(
    "worker {:>3} | max {:>20} | {}",
    delivery.worker,
    state.global_maximum(),
    recent
  )
}

/// Human-readable summary of a session.
pub fn format_snapshot(snapshot: &SessionSnapshot) -> String {
  let mut out = String::new();
  let status = if snapshot.running { "running" } else { "stopped" };

  let _ = writeln!(out, "Session {}", status);
  let _ = writeln!(out, "  Deliveries:     {}", snapshot.deliveries);
  let _ = writeln!(out, "  Global maximum: {}", snapshot.global_maximum);
  let _ = writeln!(out, "  Workers:        {}", snapshot.workers.len());

  if snapshot.non_empty_workers().next().is_none() {
    let _ = writeln!(out, "\nNo primes delivered");
    return out;
  }

  let _ = writeln!(out, "\nWorker  Recent primes (oldest first)");
  for worker in &snapshot.workers {
    let _ = writeln!(out, "{:>6}  {}", worker.index, join(worker.primes.iter().copied()));
  }
  out
}

pub fn format_check(n: u64) -> String {
  if is_prime(n) {
    format!("{} is prime", n)
  } else {
    format!("{} is not prime", n)
  }
}

fn join(values: impl Iterator<Item = u64>) -> String {
  values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}
