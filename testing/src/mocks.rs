//! Test doubles for the injected seams.
//!
//! - [`ScriptedStatusSource`]: plays back a scripted sequence of status checks
//! - [`RecordingNavigator`]: captures redirects instead of performing them

#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use trails_core::tickets::{NavigateOptions, Navigator};
use trails_payments::{PaymentError, PaymentStatus, StatusSource};

/// One scripted response from a [`ScriptedStatusSource`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Backend reports this status
    Status(PaymentStatus),
    /// Check fails with a network error carrying this message
    NetworkError(String),
}

impl From<PaymentStatus> for Step {
    fn from(status: PaymentStatus) -> Self {
        Self::Status(status)
    }
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    last: Option<Step>,
    calls: usize,
}

impl Script {
    fn next(&mut self) -> Step {
        self.calls += 1;
        if let Some(step) = self.steps.pop_front() {
            self.last = Some(step.clone());
            return step;
        }
        self.last
            .clone()
            .unwrap_or(Step::Status(PaymentStatus::Pending))
    }
}

/// Status source that replays scripted responses.
///
/// Each reference gets its own script (falling back to the default script).
/// When a script runs out its last step repeats; an empty script always
/// reports `Pending`.
///
/// # Example
///
/// ```
/// use trails_payments::PaymentStatus;
/// use trails_testing::mocks::ScriptedStatusSource;
///
/// let source = ScriptedStatusSource::new([
///     PaymentStatus::Pending,
///     PaymentStatus::Successful,
/// ]);
/// assert_eq!(source.calls(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedStatusSource {
    default_steps: Vec<Step>,
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    latency: Duration,
}

impl ScriptedStatusSource {
    /// Source replaying `steps` for every reference
    #[must_use]
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        Self {
            default_steps: steps.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Source that always reports `status`
    #[must_use]
    pub fn always(status: PaymentStatus) -> Self {
        Self::new([status])
    }

    /// Use a dedicated script for `reference`
    #[must_use]
    pub fn with_script<I, S>(self, reference: &str, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        let script = Script {
            steps: steps.into_iter().map(Into::into).collect(),
            ..Script::default()
        };
        self.lock().insert(reference.to_string(), script);
        self
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Total checks across all references
    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock().values().map(|script| script.calls).sum()
    }

    /// Checks made for `reference`
    #[must_use]
    pub fn calls_for(&self, reference: &str) -> usize {
        self.lock().get(reference).map_or(0, |script| script.calls)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Script>> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_step(&self, reference: &str) -> Step {
        let mut scripts = self.lock();
        let default_steps = &self.default_steps;
        scripts
            .entry(reference.to_string())
            .or_insert_with(|| Script {
                steps: default_steps.iter().cloned().collect(),
                ..Script::default()
            })
            .next()
    }
}

impl StatusSource for ScriptedStatusSource {
    fn fetch_status<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<PaymentStatus, PaymentError>> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            match self.next_step(reference) {
                Step::Status(status) => Ok(status),
                Step::NetworkError(message) => Err(PaymentError::Network(message)),
            }
        })
    }
}

/// Navigator that records every redirect
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingNavigator {
    /// Redirects in the order they were requested
    pub visits: Vec<(String, NavigateOptions)>,
}

impl RecordingNavigator {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the most recent redirect
    #[must_use]
    pub fn last_path(&self) -> Option<&str> {
        self.visits.last().map(|(path, _)| path.as_str())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str, options: NavigateOptions) {
        self.visits.push((path.to_string(), options));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_script_repeats_last_step() {
        let source = ScriptedStatusSource::new([
            Step::NetworkError("connection reset".to_string()),
            Step::Status(PaymentStatus::Failed),
        ]);

        assert_err!(source.fetch_status("A").await);
        assert_eq!(assert_ok!(source.fetch_status("A").await), PaymentStatus::Failed);
        assert_eq!(assert_ok!(source.fetch_status("A").await), PaymentStatus::Failed);
        assert_eq!(source.calls_for("A"), 3);
    }

    #[tokio::test]
    async fn test_references_have_independent_scripts() {
        let source = ScriptedStatusSource::always(PaymentStatus::Pending)
            .with_script("B", [PaymentStatus::Successful]);

        assert_eq!(assert_ok!(source.fetch_status("A").await), PaymentStatus::Pending);
        assert_eq!(assert_ok!(source.fetch_status("B").await), PaymentStatus::Successful);
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_recording_navigator() {
        let mut navigator = RecordingNavigator::new();
        navigator.navigate("/booking/1", NavigateOptions { replace: true });
        assert_eq!(navigator.last_path(), Some("/booking/1"));
        assert!(navigator.visits[0].1.replace);
    }
}
