//! Cancellable payment status polling.
//!
//! After checkout the provider (card or mobile money) settles asynchronously,
//! so the frontend asks the backend for the payment's status until it is
//! terminal or the attempt budget runs out.
//!
//! # Session lifecycle
//!
//! ```text
//! PENDING(attempt=0) --initial_delay--> check --interval--> check ...
//!         |                               |
//!         |                               +--> SUCCESSFUL | FAILED | CANCELLED
//!         |                               +--> TIMED_OUT (attempt == max_attempts, still pending)
//!         +--> cancel() at any point: no further checks, wait() returns Cancelled
//! ```
//!
//! Checks within one session are strictly sequential. Independent sessions
//! (one per reference) run as separate tasks and share nothing but the
//! [`StatusSource`].
//!
//! # Failed checks
//!
//! A check that fails (transport error, non-2xx, undecodable body) is logged
//! and **consumes an attempt**. The next check waits for the normal interval,
//! so a session always ends after at most `max_attempts` checks.
//!
//! # Example
//!
//! ```ignore
//! let poller = PaymentStatusPoller::new(Arc::new(client));
//! let handle = poller.spawn("TT-5F2A91", PollOptions::default())?;
//!
//! match handle.wait().await {
//!     Ok(report) => println!("{}", report.message),
//!     Err(PaymentError::Cancelled(_)) => {},
//!     Err(err) => return Err(err.into()),
//! }
//! ```

use crate::error::{PaymentError, Result};
use crate::status::{PaymentPollState, PaymentStatus, PollOutcome, PollReport};
use chrono::Utc;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Where the poller reads payment status from.
///
/// Implemented by [`crate::client::CheckoutClient`] for the REST backend and by
/// scripted sources in tests.
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of `reference`
    ///
    /// # Errors
    ///
    /// Returns an error if the status could not be retrieved.
    fn fetch_status<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<PaymentStatus>>;
}

impl<S: StatusSource + ?Sized> StatusSource for Arc<S> {
    fn fetch_status<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<PaymentStatus>> {
        (**self).fetch_status(reference)
    }
}

/// Poll session timing and budget.
///
/// # Default Values
///
/// - `max_attempts`: 20
/// - `interval`: 3 seconds
/// - `initial_delay`: 2 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Wait between consecutive checks
    pub interval: Duration,
    /// Wait before the first check
    pub initial_delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(3),
            initial_delay: Duration::from_secs(2),
        }
    }
}

impl PollOptions {
    /// Create a new options builder.
    #[must_use]
    pub fn builder() -> PollOptionsBuilder {
        PollOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Upper bound on the time a session spends waiting between checks.
    ///
    /// Saturates at [`Duration::MAX`].
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts.saturating_sub(1))
            .and_then(|waits| waits.checked_add(self.initial_delay))
            .unwrap_or(Duration::MAX)
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(PaymentError::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PollOptions`].
#[derive(Debug, Clone)]
pub struct PollOptionsBuilder {
    options: PollOptions,
}

impl PollOptionsBuilder {
    /// Set the maximum number of status checks.
    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.options.max_attempts = max_attempts;
        self
    }

    /// Set the wait between checks.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Set the wait before the first check.
    #[must_use]
    pub const fn initial_delay(mut self, delay: Duration) -> Self {
        self.options.initial_delay = delay;
        self
    }

    /// Build the [`PollOptions`].
    #[must_use]
    pub const fn build(self) -> PollOptions {
        self.options
    }
}

/// Cancellation signal shared between a session and its owner.
///
/// Cloning yields another handle to the same signal. Once cancelled it stays
/// cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    signal: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }

    /// Trigger cancellation
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    /// Whether cancellation has been triggered
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once cancellation is triggered
    pub async fn cancelled(&self) {
        let mut receiver = self.signal.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            // The sender lives in `self`, so `changed` cannot fail while we hold it
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Runs payment status poll sessions against a [`StatusSource`]
#[derive(Clone)]
pub struct PaymentStatusPoller {
    source: Arc<dyn StatusSource>,
}

impl std::fmt::Debug for PaymentStatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentStatusPoller").finish_non_exhaustive()
    }
}

impl PaymentStatusPoller {
    /// Create a poller reading from `source`
    #[must_use]
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }

    /// Start a poll session on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] if `reference` is blank or
    /// `options.max_attempts` is zero.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(&self, reference: impl Into<String>, options: PollOptions) -> Result<PollHandle> {
        let reference = reference.into();
        validate_reference(&reference)?;
        options.validate()?;

        let cancel = CancelToken::new();
        let (progress, state) = watch::channel(PaymentPollState::new(&reference, options.max_attempts));

        let task = tokio::spawn({
            let source = Arc::clone(&self.source);
            let reference = reference.clone();
            let cancel = cancel.clone();
            async move { run_session(source.as_ref(), &reference, &options, &cancel, &progress).await }
        });

        tracing::debug!(reference = %reference, max_attempts = options.max_attempts, "Poll session started");

        Ok(PollHandle {
            reference,
            cancel,
            state,
            task: Some(task),
        })
    }

    /// Start a poll session and deliver its result to `callback`.
    ///
    /// The returned token cancels the session; a cancelled session still
    /// invokes `callback` with [`PaymentError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Same as [`PaymentStatusPoller::spawn`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_with_callback<F>(
        &self,
        reference: impl Into<String>,
        options: PollOptions,
        callback: F,
    ) -> Result<CancelToken>
    where
        F: FnOnce(Result<PollReport>) + Send + 'static,
    {
        let handle = self.spawn(reference, options)?;
        let cancel = handle.cancel_token();
        tokio::spawn(async move { callback(handle.wait().await) });
        Ok(cancel)
    }

    /// Run a poll session to completion on the calling task.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] for a blank reference or zero
    /// attempt budget, and [`PaymentError::Cancelled`] if `cancel` fires first.
    pub async fn poll(
        &self,
        reference: &str,
        options: &PollOptions,
        cancel: &CancelToken,
    ) -> Result<PollReport> {
        validate_reference(reference)?;
        options.validate()?;
        let (progress, _) = watch::channel(PaymentPollState::new(reference, options.max_attempts));
        run_session(self.source.as_ref(), reference, options, cancel, &progress).await
    }
}

/// Owner's handle on a spawned poll session.
///
/// Dropping the handle cancels the session.
#[derive(Debug)]
pub struct PollHandle {
    reference: String,
    cancel: CancelToken,
    state: watch::Receiver<PaymentPollState>,
    task: Option<JoinHandle<Result<PollReport>>>,
}

impl PollHandle {
    /// Payment reference being tracked
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Stop the session; no check starts after this returns
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this session
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Latest progress snapshot
    #[must_use]
    pub fn state(&self) -> PaymentPollState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every check
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PaymentPollState> {
        self.state.clone()
    }

    /// Whether the session has ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the terminal report.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Cancelled`] if the session was cancelled before
    /// reaching a terminal state.
    pub async fn wait(mut self) -> Result<PollReport> {
        let Some(task) = self.task.take() else {
            return Err(PaymentError::Cancelled(self.reference.clone()));
        };
        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(PaymentError::Cancelled(self.reference.clone())),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn validate_reference(reference: &str) -> Result<()> {
    if reference.trim().is_empty() {
        return Err(PaymentError::InvalidArgument(
            "payment reference must not be empty".to_string(),
        ));
    }
    Ok(())
}

async fn run_session(
    source: &dyn StatusSource,
    reference: &str,
    options: &PollOptions,
    cancel: &CancelToken,
    progress: &watch::Sender<PaymentPollState>,
) -> Result<PollReport> {
    let mut state = PaymentPollState::new(reference, options.max_attempts);
    let mut delay = options.initial_delay;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(&state)),
            () = tokio::time::sleep(delay) => {},
        }
        if cancel.is_cancelled() {
            return Err(cancelled(&state));
        }

        state.attempt += 1;
        let checked = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(&state)),
            result = source.fetch_status(reference) => result,
        };
        state.last_checked_at = Some(Utc::now());

        match checked {
            Ok(status) => {
                state.status = status;
                tracing::debug!(
                    reference,
                    attempt = state.attempt,
                    status = %status,
                    "Payment status checked"
                );
                if let Some(outcome) = status.terminal_outcome() {
                    progress.send_replace(state.clone());
                    return Ok(finish(&state, outcome));
                }
            },
            Err(err) => {
                tracing::warn!(
                    reference,
                    attempt = state.attempt,
                    max_attempts = state.max_attempts,
                    error = %err,
                    "Payment status check failed, attempt consumed"
                );
            },
        }

        progress.send_replace(state.clone());
        if state.is_exhausted() {
            return Ok(finish(&state, PollOutcome::TimedOut));
        }
        delay = options.interval;
    }
}

fn finish(state: &PaymentPollState, outcome: PollOutcome) -> PollReport {
    tracing::info!(
        reference = %state.reference,
        attempts = state.attempt,
        outcome = %outcome,
        "Poll session finished"
    );
    PollReport::new(&state.reference, outcome, state.attempt)
}

fn cancelled(state: &PaymentPollState) -> PaymentError {
    tracing::info!(
        reference = %state.reference,
        attempts = state.attempt,
        "Poll session cancelled"
    );
    PaymentError::Cancelled(state.reference.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_options_builder() {
        let options = PollOptions::builder()
            .max_attempts(5)
            .interval(Duration::from_millis(500))
            .initial_delay(Duration::ZERO)
            .build();

        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.interval, Duration::from_millis(500));
        assert_eq!(options.initial_delay, Duration::ZERO);
        assert_eq!(options.max_wait(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_budget() {
        let options = PollOptions::default();
        assert_eq!(options.max_wait(), Duration::from_secs(2 + 3 * 19));
    }

    #[test]
    fn test_max_wait_saturates() {
        let options = PollOptions::builder()
            .max_attempts(u32::MAX)
            .interval(Duration::MAX)
            .build();
        assert_eq!(options.max_wait(), Duration::MAX);
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let options = PollOptions::builder().max_attempts(0).build();
        assert!(matches!(options.validate(), Err(PaymentError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_cancel_token_is_sticky() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());

        token.cancel();
        observer.cancelled().await;
        assert!(observer.is_cancelled());
    }
}
