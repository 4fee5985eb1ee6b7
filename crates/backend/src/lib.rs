mod actor;
mod runtime;

mod domain;
pub use domain::{
  config,
  history::History,
  prime::is_prime,
  session::{GLOBAL_MAXIMUM_FLOOR, SessionSnapshot, SessionState, WorkerSnapshot},
};

pub mod sink;

pub use actor::{
  SupervisorActor, SupervisorError,
  handle::{SendError, SupervisorHandle},
  lifecycle::visibility::{Visibility, VisibilitySignal, VisibilitySubscription},
  message::Delivery,
  pipeline::{
    CANCEL_CHECK_INTERVAL, DeliveryGate, GateState, PoolError, ScanOutcome, SearchWorker, WorkCursor, WorkerExit,
    WorkerPool, WorkerStats, scan_range,
  },
};
pub use runtime::{Runtime, RuntimeConfig};
