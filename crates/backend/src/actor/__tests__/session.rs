//! Session E2E tests: deliveries, flow control, and restarts through the supervisor.

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use pretty_assertions::assert_eq;

  use crate::actor::{
    __tests__::helpers::{SupervisorTestContext, settings, wait_for},
    message::Delivery,
  };

  const TIMEOUT: Duration = Duration::from_secs(10);
  /// Upper bound for requests that must not wait on the sink
  const PROMPT: Duration = Duration::from_secs(2);

  // ==========================================================================
  // Delivery Tests
  // ==========================================================================

  /// Test: each worker's first delivery is the first prime of its seed range.
  #[tokio::test]
  async fn test_first_delivery_per_worker() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 5, 2)).await.expect("start");

    assert!(
      wait_for(TIMEOUT, || async { sink.first_from(0).is_some() && sink.first_from(1).is_some() }).await,
      "both workers should deliver"
    );

    assert_eq!(sink.first_from(0), Some(2));
    assert_eq!(sink.first_from(1), Some(1_009));
    ctx.handle.stop().await.expect("stop");
  }

  /// Test: a worker's next delivery waits for the sink to acknowledge the last.
  #[tokio::test]
  async fn test_gate_stays_closed_until_acknowledged() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 4, 1)).await.expect("start");

    let first = notices.recv().await.expect("first notice");
    assert_eq!(first.delivery, Delivery { worker: 0, value: 2 });
    assert_eq!(first.global_maximum, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(
      notices.try_recv().is_err(),
      "no second delivery while the first is unacknowledged"
    );

    first.ack();
    let second = tokio::time::timeout(TIMEOUT, notices.recv())
      .await
      .expect("second notice in time")
      .expect("second notice");
    assert_eq!(second.delivery.worker, 0);
    assert!(second.delivery.value > 2);
    assert_eq!(second.global_maximum, second.delivery.value);

    // Stopping does not wait for the pending acknowledgement
    tokio::time::timeout(PROMPT, ctx.handle.stop())
      .await
      .expect("stop while a notice is held")
      .expect("stop");
    drop(second);
  }

  // ==========================================================================
  // Pending Delivery Tests
  // ==========================================================================

  /// Test: stop returns promptly while the sink holds an unacknowledged delivery.
  #[tokio::test]
  async fn test_stop_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 4, 1)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    tokio::time::timeout(PROMPT, ctx.handle.stop())
      .await
      .expect("stop should not wait for the acknowledgement")
      .expect("stop");

    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    assert!(!snapshot.running);
    assert_eq!(snapshot.deliveries, 1);

    // A late acknowledgement is harmless
    pending.ack();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(notices.try_recv().is_err(), "no deliveries after stop");
  }

  /// Test: snapshots are answered while a delivery waits for its acknowledgement.
  #[tokio::test]
  async fn test_snapshot_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 4, 1)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    let snapshot = tokio::time::timeout(PROMPT, ctx.handle.snapshot())
      .await
      .expect("snapshot should not wait for the acknowledgement")
      .expect("snapshot");
    assert!(snapshot.running);
    assert_eq!(snapshot.deliveries, 1);
    assert_eq!(snapshot.global_maximum, 2);

    // The pending delivery is still in place, so the worker stays gated
    pending.ack();
    let next = tokio::time::timeout(TIMEOUT, notices.recv())
      .await
      .expect("next notice in time")
      .expect("next notice");
    assert!(next.delivery.value > 2);
    drop(next);
    ctx.handle.stop().await.expect("stop");
  }

  /// Test: a restart abandons the pending delivery and the new session delivers from zero.
  #[tokio::test]
  async fn test_restart_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 4, 2)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    tokio::time::timeout(PROMPT, ctx.handle.start(settings(1_000, 4, 1)))
      .await
      .expect("restart should not wait for the acknowledgement")
      .expect("restart");

    let fresh = tokio::time::timeout(TIMEOUT, notices.recv())
      .await
      .expect("fresh notice in time")
      .expect("fresh notice");
    assert_eq!(fresh.delivery, Delivery { worker: 0, value: 2 });
    assert_eq!(fresh.global_maximum, 2);

    drop(pending);
    drop(fresh);
    ctx.handle.stop().await.expect("stop");
  }

  /// Test: histories keep the last H values per worker and the global maximum tracks every delivery.
  #[tokio::test]
  async fn test_histories_bounded_and_global_maximum_tracked() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 3, 2)).await.expect("start");

    assert!(wait_for(TIMEOUT, || async { sink.len() >= 20 }).await);
    ctx.handle.stop().await.expect("stop");

    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    let recorded = sink.recorded();

    assert!(!snapshot.running);
    assert_eq!(snapshot.deliveries, recorded.len() as u64);
    assert_eq!(snapshot.workers.len(), 2);

    let max = recorded.iter().map(|r| r.delivery.value).max().unwrap();
    assert_eq!(snapshot.global_maximum, max);
    assert!(
      recorded.windows(2).all(|w| w[0].global_maximum <= w[1].global_maximum),
      "global maximum never decreases"
    );

    for worker in &snapshot.workers {
      let values: Vec<u64> = recorded
        .iter()
        .filter(|r| r.delivery.worker == worker.index)
        .map(|r| r.delivery.value)
        .collect();
      let tail = values[values.len().saturating_sub(3)..].to_vec();
      assert!(worker.primes.len() <= 3);
      assert_eq!(worker.primes, tail, "history holds the most recent values oldest first");
      assert!(worker.primes.windows(2).all(|w| w[0] < w[1]));
    }
  }

  // ==========================================================================
  // Restart Tests
  // ==========================================================================

  /// Test: restarting replaces the pool and no delivery from the old pool leaks into the new session.
  #[tokio::test]
  async fn test_restart_discards_previous_pool() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 4, 4)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() >= 8 }).await);

    ctx.handle.start(settings(1_000, 4, 1)).await.expect("restart");
    let mark = sink.len();

    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    assert!(snapshot.running);
    assert_eq!(snapshot.workers.len(), 1);

    assert!(wait_for(TIMEOUT, || async { sink.len() >= mark + 5 }).await);
    ctx.handle.stop().await.expect("stop");

    let recorded = sink.recorded();
    assert!(
      recorded[mark..].iter().all(|r| r.delivery.worker == 0),
      "only the new single worker may deliver after restart"
    );
    assert_eq!(recorded[mark].delivery.value, 2, "new session starts from zero");

    let stopped = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), stopped, "no deliveries after stop");
  }

  /// Test: an explicit stop then start runs a fresh session with no stale deliveries.
  #[tokio::test]
  async fn test_stop_then_start_discards_previous_pool() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 4, 4)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() >= 8 }).await);

    ctx.handle.stop().await.expect("stop");
    let mark = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), mark, "no deliveries between stop and start");

    ctx.handle.start(settings(1_000, 4, 1)).await.expect("start again");
    assert!(wait_for(TIMEOUT, || async { sink.len() >= mark + 5 }).await);
    ctx.handle.stop().await.expect("stop");

    let recorded = sink.recorded();
    assert!(
      recorded[mark..].iter().all(|r| r.delivery.worker == 0),
      "only the new single worker may deliver after start"
    );
    assert_eq!(recorded[mark].delivery, Delivery { worker: 0, value: 2 });
    assert_eq!(recorded[mark].global_maximum, 2, "global maximum starts over");

    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.deliveries, (recorded.len() - mark) as u64);

    let stopped = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), stopped, "no deliveries after the final stop");
  }

  /// Test: a restart resets histories, counters, and the global maximum.
  #[tokio::test]
  async fn test_restart_resets_session_state() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(10_000, 2, 2)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.first_from(1).is_some() }).await);

    let before = ctx.handle.snapshot().await.expect("snapshot");
    assert!(before.global_maximum >= 10_007);

    ctx.handle.start(settings(1_000, 2, 1)).await.expect("restart");
    let mark = sink.len();
    assert!(wait_for(TIMEOUT, || async { sink.len() > mark }).await);
    ctx.handle.stop().await.expect("stop");

    let recorded = sink.recorded();
    assert_eq!(recorded[mark].delivery, Delivery { worker: 0, value: 2 });
    assert_eq!(recorded[mark].global_maximum, 2);

    let after = ctx.handle.snapshot().await.expect("snapshot");
    assert_eq!(after.workers.len(), 1);
    assert_eq!(after.deliveries, (recorded.len() - mark) as u64);
    assert!(after.workers[0].primes.len() <= 2);
  }
}
