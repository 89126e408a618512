//! Payment status model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PaymentError;

/// Status reported by the payments backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Still being processed by the provider
    Pending,
    /// Funds captured
    Successful,
    /// Provider declined or errored
    Failed,
    /// Payer or provider cancelled
    Cancelled,
}

impl PaymentStatus {
    /// Map a remote status string.
    ///
    /// Matching is case-insensitive; anything unrecognised is still pending.
    #[must_use]
    pub fn from_remote(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "successful" => Self::Successful,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Terminal outcome for this status, if it is terminal
    #[must_use]
    pub const fn terminal_outcome(self) -> Option<PollOutcome> {
        match self {
            Self::Pending => None,
            Self::Successful => Some(PollOutcome::Successful),
            Self::Failed => Some(PollOutcome::Failed),
            Self::Cancelled => Some(PollOutcome::Cancelled),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_remote(&raw))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Body of `GET {api_base}/{reference}/status/`
#[derive(Clone, Debug, Deserialize)]
pub struct StatusResponse {
    /// Current status
    pub status: PaymentStatus,
}

/// Terminal state of a poll session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// Payment completed
    Successful,
    /// Payment failed
    Failed,
    /// Payment was cancelled at the provider
    Cancelled,
    /// Attempts exhausted while still pending
    TimedOut,
}

impl PollOutcome {
    /// Message shown to the traveller
    #[must_use]
    pub fn message(self, reference: &str) -> String {
        match self {
            Self::Successful => "Payment successful! Your booking is confirmed.".to_string(),
            Self::Failed => "Payment failed. Please try again or use a different payment method.".to_string(),
            Self::Cancelled => "Payment was cancelled.".to_string(),
            Self::TimedOut => format!(
                "Payment verification is taking longer than expected. \
                 Please contact support with your payment reference {reference}."
            ),
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
        };
        f.write_str(text)
    }
}

/// Progress of a poll session, published after every check
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentPollState {
    /// Payment reference being tracked
    pub reference: String,
    /// Checks performed so far
    pub attempt: u32,
    /// Attempt budget
    pub max_attempts: u32,
    /// Last status observed (pending until a check succeeds)
    pub status: PaymentStatus,
    /// When the last check completed
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl PaymentPollState {
    /// Initial state before any check
    #[must_use]
    pub fn new(reference: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            reference: reference.into(),
            attempt: 0,
            max_attempts,
            status: PaymentStatus::Pending,
            last_checked_at: None,
        }
    }

    /// Whether the attempt budget is used up
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// Final result of a poll session
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Payment reference
    pub reference: String,
    /// Terminal state
    pub outcome: PollOutcome,
    /// Checks performed
    pub attempts: u32,
    /// Message for the traveller
    pub message: String,
}

impl PollReport {
    pub(crate) fn new(reference: &str, outcome: PollOutcome, attempts: u32) -> Self {
        Self {
            reference: reference.to_string(),
            outcome,
            attempts,
            message: outcome.message(reference),
        }
    }

    /// Whether the payment went through
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.outcome == PollOutcome::Successful
    }

    /// Treat a timed-out session as an error.
    ///
    /// Settled outcomes (including failed and cancelled payments) pass through.
    ///
    /// # Errors
    ///
    /// [`PaymentError::Timeout`] if the session ran out of attempts.
    pub fn into_settled(self) -> crate::Result<Self> {
        if self.outcome == PollOutcome::TimedOut {
            return Err(PaymentError::Timeout {
                reference: self.reference,
                attempts: self.attempts,
            });
        }
        Ok(self)
    }
}
