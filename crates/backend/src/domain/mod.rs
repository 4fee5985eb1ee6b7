//! Domain types - search session entities
//!
//! Plain data and pure functions with no concurrency of their own. The
//! supervisor actor owns the mutable pieces; workers only use the oracle.

pub mod history;
pub mod prime;
pub mod session;

pub use primescan_core::config;
