//! Error types for checkout and status polling.

use thiserror::Error;
use trails_core::TrailsError;

/// Result alias used throughout `trails-payments`.
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors raised while creating or tracking a payment
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request rejected before it was sent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure or non-success HTTP status
    #[error("network error: {0}")]
    Network(String),

    /// Status polling exhausted its attempt budget.
    ///
    /// Poll sessions report this as [`PollOutcome::TimedOut`](crate::PollOutcome);
    /// [`PollReport::into_settled`](crate::PollReport::into_settled) converts
    /// it for callers that want an error.
    #[error("payment {reference} still pending after {attempts} checks")]
    Timeout {
        /// Payment reference
        reference: String,
        /// Checks performed
        attempts: u32,
    },

    /// Backend accepted the request but declined to create the payment
    #[error("payment rejected: {0}")]
    Rejected(String),

    /// Caller cancelled the poll session
    #[error("poll session for {0} was cancelled")]
    Cancelled(String),

    /// Response body could not be decoded
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl PaymentError {
    /// Whether a later attempt could succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. })
    }
}

impl From<TrailsError> for PaymentError {
    fn from(err: TrailsError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
