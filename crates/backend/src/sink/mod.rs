//! Outbound seam to whatever renders or consumes delivered primes.
//!
//! The supervisor awaits [`DeliverySink::deliver`] before reopening the
//! delivering worker's gate. Returning from `deliver` is the acknowledgement,
//! so a slow sink directly slows the delivery rate and nothing queues up.

mod channel;

pub use channel::{ChannelSink, DeliveryNotice};

use crate::{actor::message::Delivery, domain::session::SessionState};

#[async_trait::async_trait]
pub trait DeliverySink: Send + Sync {
  /// Handle one delivery. `state` already includes it.
  async fn deliver(&self, delivery: &Delivery, state: &SessionState);
}

/// Sink that acknowledges every delivery immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait::async_trait]
impl DeliverySink for NullSink {
  async fn deliver(&self, _delivery: &Delivery, _state: &SessionState) {}
}
