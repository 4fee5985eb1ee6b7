//! Channel-backed sink for hosts that consume deliveries on their own task.

use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use super::DeliverySink;
use crate::{actor::message::Delivery, domain::session::SessionState};

/// A delivery forwarded to the host, waiting for acknowledgement.
///
/// Call [`ack`](Self::ack) once the value has been handled. Dropping the
/// notice acknowledges it as well, so a host that stops listening never
/// stalls the supervisor.
#[derive(Debug)]
pub struct DeliveryNotice {
  pub delivery: Delivery,
  /// Global maximum after this delivery was recorded
  pub global_maximum: u64,
  ack: oneshot::Sender<()>,
}

impl DeliveryNotice {
  pub fn ack(self) {
    let _ = self.ack.send(());
  }
}

/// Forwards each delivery over a bounded channel and waits for its acknowledgement.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  tx: mpsc::Sender<DeliveryNotice>,
}

impl ChannelSink {
  /// Create a sink and the receiver the host reads notices from.
  pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DeliveryNotice>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Self { tx }, rx)
  }
}

#[async_trait::async_trait]
impl DeliverySink for ChannelSink {
  async fn deliver(&self, delivery: &Delivery, state: &SessionState) {
    let (ack_tx, ack_rx) = oneshot::channel();
    let notice = DeliveryNotice {
      delivery: *delivery,
      global_maximum: state.global_maximum(),
      ack: ack_tx,
    };

    if self.tx.send(notice).await.is_err() {
      trace!(worker = delivery.worker, "Sink receiver closed, delivery acknowledged");
      return;
    }
    // Err means the notice was dropped, which counts as acknowledged
    let _ = ack_rx.await;
  }
}
