//! Lifecycle E2E tests: visibility, invalid settings, shutdown, and cancellation.

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use primescan_core::ConfigError;
  use tokio_util::sync::CancellationToken;

  use crate::{
    actor::{
      SupervisorActor, SupervisorError,
      __tests__::helpers::{RecordingSink, SupervisorTestContext, settings, wait_for},
      handle::SendError,
      lifecycle::visibility::{Visibility, VisibilitySignal},
    },
    domain::config::SearchSettings,
  };

  const TIMEOUT: Duration = Duration::from_secs(10);
  /// Upper bound for requests that must not wait on the sink
  const PROMPT: Duration = Duration::from_secs(2);

  fn zero_range() -> SearchSettings {
    SearchSettings {
      range_size: 0,
      history_length: 3,
      parallelism: 2,
    }
  }

  // ==========================================================================
  // Visibility Tests
  // ==========================================================================

  /// Test: hiding the environment stops the running pool.
  #[tokio::test]
  async fn test_hidden_stops_search() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 3, 2)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() > 0 }).await);

    ctx.visibility.set(Visibility::Hidden);
    assert!(
      wait_for(TIMEOUT, || async { !ctx.handle.snapshot().await.expect("snapshot").running }).await,
      "search should stop once hidden"
    );

    let stopped = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), stopped, "no deliveries while hidden");

    // Stopping keeps the session state for inspection
    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.deliveries, stopped as u64);
  }

  /// Test: hiding the environment stops the search even while a delivery awaits acknowledgement.
  #[tokio::test]
  async fn test_hidden_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 3, 1)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    ctx.visibility.set(Visibility::Hidden);
    assert!(
      wait_for(PROMPT, || async { !ctx.handle.snapshot().await.expect("snapshot").running }).await,
      "search should stop without waiting for the acknowledgement"
    );

    pending.ack();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(notices.try_recv().is_err(), "no deliveries while hidden");
  }

  /// Test: becoming visible again does not restart the search by itself.
  #[tokio::test]
  async fn test_visible_does_not_auto_start() {
    let (ctx, _sink) = SupervisorTestContext::recording();
    ctx.visibility.set(Visibility::Hidden);
    ctx.visibility.set(Visibility::Visible);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!ctx.handle.snapshot().await.expect("snapshot").running);
  }

  /// Test: the supervisor keeps serving requests after the visibility publisher is gone.
  #[tokio::test]
  async fn test_survives_visibility_publisher_drop() {
    let sink = Arc::new(RecordingSink::default());
    let signal = VisibilitySignal::new();
    let cancel = CancellationToken::new();
    let handle = SupervisorActor::spawn(sink.clone(), Some(signal.subscribe()), cancel.clone());
    drop(signal);
    tokio::time::sleep(Duration::from_millis(20)).await;

    handle.start(settings(1_000, 3, 1)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() > 0 }).await);
    handle.stop().await.expect("stop");
    cancel.cancel();
  }

  // ==========================================================================
  // Settings Tests
  // ==========================================================================

  /// Test: invalid settings are rejected and nothing starts.
  #[tokio::test]
  async fn test_invalid_settings_rejected() {
    let (ctx, sink) = SupervisorTestContext::recording();

    let err = ctx.handle.start(zero_range()).await.unwrap_err();
    assert!(matches!(err, SupervisorError::Config(ConfigError::ZeroRangeSize)));

    let err = ctx
      .handle
      .start(SearchSettings {
        range_size: 10,
        history_length: 3,
        parallelism: 0,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, SupervisorError::Config(ConfigError::ZeroParallelism)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!ctx.handle.snapshot().await.expect("snapshot").running);
    assert_eq!(sink.len(), 0);
  }

  /// Test: a rejected start leaves the running session untouched.
  #[tokio::test]
  async fn test_invalid_restart_keeps_current_session() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 3, 2)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() >= 2 }).await);

    assert!(ctx.handle.start(zero_range()).await.is_err());

    let snapshot = ctx.handle.snapshot().await.expect("snapshot");
    assert!(snapshot.running);
    assert_eq!(snapshot.workers.len(), 2);

    let count = sink.len();
    assert!(wait_for(TIMEOUT, || async { sink.len() > count }).await, "search keeps delivering");
    ctx.handle.stop().await.expect("stop");
  }

  // ==========================================================================
  // Shutdown Tests
  // ==========================================================================

  /// Test: stop is a no-op when nothing runs and may be repeated.
  #[tokio::test]
  async fn test_stop_is_idempotent() {
    let (ctx, _sink) = SupervisorTestContext::recording();
    ctx.handle.stop().await.expect("stop idle");

    ctx.handle.start(settings(1_000, 3, 1)).await.expect("start");
    ctx.handle.stop().await.expect("first stop");
    ctx.handle.stop().await.expect("second stop");

    assert!(!ctx.handle.snapshot().await.expect("snapshot").running);
  }

  /// Test: after shutdown every request reports the actor as gone.
  #[tokio::test]
  async fn test_shutdown_closes_handle() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 3, 2)).await.expect("start");
    ctx.handle.shutdown().await.expect("shutdown");

    assert!(wait_for(TIMEOUT, || async { ctx.handle.is_closed() }).await);
    assert!(matches!(ctx.handle.snapshot().await, Err(SendError::ActorGone)));
    assert!(matches!(ctx.handle.stop().await, Err(SendError::ActorGone)));
    assert!(matches!(
      ctx.handle.start(settings(1_000, 3, 1)).await,
      Err(SupervisorError::ActorGone)
    ));

    let stopped = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), stopped, "workers are joined on shutdown");
  }

  /// Test: cancelling the token ends the supervisor and its pool.
  #[tokio::test]
  async fn test_cancellation_ends_supervisor() {
    let (ctx, sink) = SupervisorTestContext::recording();
    ctx.handle.start(settings(1_000, 3, 2)).await.expect("start");
    assert!(wait_for(TIMEOUT, || async { sink.len() > 0 }).await);

    ctx.cancel.cancel();
    assert!(wait_for(TIMEOUT, || async { ctx.handle.is_closed() }).await);

    let stopped = sink.len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), stopped);
  }

  /// Test: cancellation ends the supervisor while a delivery awaits acknowledgement.
  #[tokio::test]
  async fn test_cancellation_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 3, 1)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    ctx.cancel.cancel();
    assert!(
      wait_for(PROMPT, || async { ctx.handle.is_closed() }).await,
      "supervisor should exit without waiting for the acknowledgement"
    );
    assert!(matches!(ctx.handle.snapshot().await, Err(SendError::ActorGone)));
    drop(pending);
  }

  /// Test: shutdown ends the supervisor while a delivery awaits acknowledgement.
  #[tokio::test]
  async fn test_shutdown_while_delivery_pending() {
    let (ctx, mut notices) = SupervisorTestContext::channel();
    ctx.handle.start(settings(1_000, 3, 1)).await.expect("start");
    let pending = notices.recv().await.expect("first notice");

    ctx.handle.shutdown().await.expect("shutdown");
    assert!(wait_for(PROMPT, || async { ctx.handle.is_closed() }).await);
    drop(pending);
  }
}
