//! Error types for pricing, quoting and ticket validation.

use thiserror::Error;

/// Result alias used throughout `trails-core`.
pub type Result<T> = std::result::Result<T, TrailsError>;

/// Errors raised by the booking core.
///
/// Both variants are recoverable at the call site: pricing callers reject the
/// input, ticket callers compute a fallback route instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrailsError {
    /// An input was outside its accepted range (bad group size, malformed amount or ID)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist in the active set
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of entity that was looked up
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },
}

impl TrailsError {
    /// Create an [`TrailsError::InvalidArgument`] from any message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a [`TrailsError::NotFound`] for the given resource kind.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TrailsError::invalid("group size must be at least 1").to_string(),
            "invalid argument: group size must be at least 1"
        );
        assert_eq!(
            TrailsError::not_found("ticket", 42).to_string(),
            "ticket 42 not found"
        );
    }
}
