//! Actor-based concurrency primitives
//!
//! The search runs as one supervisor task plus a pool of worker threads.
//! Instead of guarding session state with `Arc<Mutex<...>>`, the supervisor
//! owns it outright and everything else talks to it by message passing.
//!
//! # Architecture
//!
//! - Workers are OS threads doing CPU-bound trial division
//! - Workers hand primes to the supervisor over a per-pool channel
//! - The supervisor serializes aggregation and reopens each worker's gate
//! - Control requests reach the supervisor through [`handle::SupervisorHandle`]
//!
//! # Actors
//!
//! - [`SupervisorActor`]: Owns the worker pool and the session state
//! - [`pipeline::SearchWorker`]: Claims and scans sub-ranges of the integers
//! - [`lifecycle::visibility::VisibilitySignal`]: Publishes foreground/background changes
//!
//! See [`pipeline`] for the shared cursor and delivery gates.

pub mod handle;
pub mod pipeline;
mod supervisor;

pub mod lifecycle;
pub mod message;

#[cfg(test)]
mod __tests__;

pub use supervisor::{SupervisorActor, SupervisorError};
