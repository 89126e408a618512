//! Payment status poller session tests.
//!
//! Timers run on Tokio's paused clock, so every test is deterministic and
//! completes instantly regardless of the configured intervals.
//!
//! Run with: `cargo test -p trails-payments --test poller_test`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_err;
use trails_payments::{
    CancelToken, PaymentError, PaymentStatus, PaymentStatusPoller, PollOptions, PollOutcome,
};
use trails_testing::{init_tracing, ScriptedStatusSource, Step};

use PaymentStatus::{Cancelled, Failed, Pending, Successful};

fn options(max_attempts: u32) -> PollOptions {
    PollOptions::builder()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_secs(2))
        .interval(Duration::from_secs(5))
        .build()
}

fn poller(source: &Arc<ScriptedStatusSource>) -> PaymentStatusPoller {
    PaymentStatusPoller::new(Arc::clone(source) as Arc<dyn trails_payments::StatusSource>)
}

/// Always pending with a budget of three: three checks, then `TimedOut`.
#[tokio::test(start_paused = true)]
async fn test_times_out_after_max_attempts() {
    init_tracing();
    let source = Arc::new(ScriptedStatusSource::always(Pending));

    let report = poller(&source)
        .spawn("TT-TIMEOUT", options(3))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.attempts, 3);
    assert!(report.message.contains("taking longer than expected"));
    assert_eq!(source.calls(), 3);

    // Nothing is left scheduled
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 3);
}

/// Pending, pending, successful: exactly three checks.
#[tokio::test(start_paused = true)]
async fn test_succeeds_on_third_check() {
    let source = Arc::new(ScriptedStatusSource::new([Pending, Pending, Successful]));

    let report = poller(&source)
        .spawn("TT-OK", options(10))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Successful);
    assert!(report.is_successful());
    assert_eq!(report.attempts, 3);
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_and_cancelled_are_terminal() {
    let source = Arc::new(
        ScriptedStatusSource::default()
            .with_script("TT-FAIL", [Pending, Failed])
            .with_script("TT-CANCEL", [Cancelled]),
    );
    let poller = poller(&source);

    let failed = poller.spawn("TT-FAIL", options(10)).unwrap().wait().await.unwrap();
    let cancelled = poller.spawn("TT-CANCEL", options(10)).unwrap().wait().await.unwrap();

    assert_eq!(failed.outcome, PollOutcome::Failed);
    assert_eq!(failed.attempts, 2);
    assert_eq!(cancelled.outcome, PollOutcome::Cancelled);
    assert_eq!(cancelled.attempts, 1);
}

/// Checks wait for the initial delay, then the interval.
#[tokio::test(start_paused = true)]
async fn test_schedule_follows_initial_delay_then_interval() {
    let source = Arc::new(ScriptedStatusSource::always(Pending));
    let handle = poller(&source).spawn("TT-SCHEDULE", options(5)).unwrap();

    tokio::time::sleep(Duration::from_millis(1_900)).await;
    assert_eq!(source.calls(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(handle.state().attempt, 1);

    tokio::time::sleep(Duration::from_millis(4_800)).await;
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(handle.state().status, Pending);
    assert!(handle.state().last_checked_at.is_some());
}

/// Cancelling between the first and second checks prevents the second.
#[tokio::test(start_paused = true)]
async fn test_cancel_between_checks_prevents_next_check() {
    let source = Arc::new(ScriptedStatusSource::always(Pending));
    let handle = poller(&source).spawn("TT-CANCELLED", options(10)).unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(source.calls(), 1);

    handle.cancel();
    let err = assert_err!(handle.wait().await);
    assert!(matches!(err, PaymentError::Cancelled(ref reference) if reference == "TT-CANCELLED"));

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_initial_delay() {
    let source = Arc::new(ScriptedStatusSource::always(Successful));
    let handle = poller(&source).spawn("TT-EARLY", options(3)).unwrap();

    handle.cancel();
    assert_err!(handle.wait().await);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_in_flight_check() {
    let source = Arc::new(
        ScriptedStatusSource::always(Successful).with_latency(Duration::from_secs(10)),
    );
    let handle = poller(&source).spawn("TT-SLOW", options(3)).unwrap();

    // First check starts at 2s and would answer at 12s
    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.cancel();

    assert!(matches!(handle.wait().await, Err(PaymentError::Cancelled(_))));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_session() {
    let source = Arc::new(ScriptedStatusSource::always(Pending));
    let handle = poller(&source).spawn("TT-DROPPED", options(10)).unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(source.calls(), 1);
}

/// Failed checks consume an attempt, so the session still terminates.
#[tokio::test(start_paused = true)]
async fn test_network_errors_consume_attempts() {
    let source = Arc::new(ScriptedStatusSource::new([Step::NetworkError(
        "connection refused".to_string(),
    )]));

    let report = poller(&source)
        .spawn("TT-OFFLINE", options(4))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.attempts, 4);
    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_network_error_does_not_abort_session() {
    let source = Arc::new(ScriptedStatusSource::new([
        Step::NetworkError("timeout".to_string()),
        Step::Status(Successful),
    ]));

    let report = poller(&source)
        .spawn("TT-FLAKY", options(5))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Successful);
    assert_eq!(report.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_independent_sessions_do_not_interfere() {
    let source = Arc::new(
        ScriptedStatusSource::default()
            .with_script("TT-A", [Pending, Pending, Pending, Successful])
            .with_script("TT-B", [Failed]),
    );
    let poller = poller(&source);

    let a = poller.spawn("TT-A", options(10)).unwrap();
    let b = poller.spawn("TT-B", options(10)).unwrap();
    let (a, b) = tokio::join!(a.wait(), b.wait());

    assert_eq!(a.unwrap().outcome, PollOutcome::Successful);
    assert_eq!(b.unwrap().outcome, PollOutcome::Failed);
    assert_eq!(source.calls_for("TT-A"), 4);
    assert_eq!(source.calls_for("TT-B"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_callback_receives_terminal_report() {
    let source = Arc::new(ScriptedStatusSource::new([Pending, Successful]));
    let delivered = Arc::new(Mutex::new(None));

    let sink = Arc::clone(&delivered);
    poller(&source)
        .spawn_with_callback("TT-CALLBACK", options(5), move |result| {
            *sink.lock().unwrap() = Some(result.map(|report| report.outcome));
        })
        .unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let outcome = delivered.lock().unwrap().take().expect("callback should have run");
    assert_eq!(outcome.unwrap(), PollOutcome::Successful);
}

#[tokio::test(start_paused = true)]
async fn test_inline_poll_honours_cancel_token() {
    let source = Arc::new(ScriptedStatusSource::always(Pending));
    let poller = poller(&source);
    let cancel = CancelToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(8)).await;
        canceller.cancel();
    });

    let result = poller.poll("TT-INLINE", &options(10), &cancel).await;
    assert!(matches!(result, Err(PaymentError::Cancelled(_))));
    // Checks at 2s and 7s only
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_invalid_sessions_are_rejected() {
    let source = Arc::new(ScriptedStatusSource::always(Pending));
    let poller = poller(&source);

    assert!(matches!(
        poller.spawn("   ", options(3)),
        Err(PaymentError::InvalidArgument(_))
    ));
    assert!(matches!(
        poller.spawn("TT-1", options(0)),
        Err(PaymentError::InvalidArgument(_))
    ));
    assert_eq!(source.calls(), 0);
}
