//! Ticket ID validation for booking routes.
//!
//! Route parameters arrive as text (or occasionally as numbers from links
//! built in code). The validator checks them against the active tickets in a
//! [`TicketRegistry`] and, when they do not resolve, works out where the
//! traveller should be sent instead.
//!
//! # Example
//!
//! ```
//! use trails_core::tickets::{InMemoryTicketRegistry, TicketIdValidator, ValidTicket};
//!
//! let registry = InMemoryTicketRegistry::new(vec![
//!     ValidTicket::active(1, "Kakum Canopy Walk"),
//!     ValidTicket::active(2, "Cape Coast Castle"),
//! ]);
//! let validator = TicketIdValidator::new(registry);
//!
//! assert_eq!(validator.validate(Some("2".into())).ticket_id, Some(2));
//!
//! let invalid = validator.validate(Some("abc".into()));
//! assert!(!invalid.is_valid);
//! assert_eq!(invalid.redirect_path.as_deref(), Some("/booking/1"));
//! ```

mod redirect;
mod registry;

pub use redirect::{booking_path, compute_redirect_path, TICKET_LISTING_PATH};
pub use registry::{seed_tickets, InMemoryTicketRegistry, TicketRegistry, TicketStatus, ValidTicket};

use crate::error::TrailsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ticket used for redirects when the registry has no active tickets
pub const FALLBACK_TICKET_ID: u32 = 1;

/// A raw ticket ID as received from a route or link
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketIdInput {
    /// Numeric ID
    Number(i64),
    /// Route parameter text
    Text(String),
}

impl fmt::Display for TicketIdInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<&str> for TicketIdInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TicketIdInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TicketIdInput {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for TicketIdInput {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl TicketIdInput {
    /// Coerce to a positive ticket ID.
    ///
    /// Text is trimmed and must parse as a whole base-10 integer.
    ///
    /// # Errors
    ///
    /// Returns [`TicketIdError::Malformed`] if the value is not an integer or
    /// is not positive.
    pub fn coerce(&self) -> Result<u32, TicketIdError> {
        let number = match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse::<i64>().ok(),
        };
        number
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| TicketIdError::Malformed {
                raw: self.to_string(),
            })
    }
}

/// Why a ticket ID did not validate
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TicketIdError {
    /// No ID in the route
    #[error("No ticket ID provided")]
    Missing,

    /// ID could not be read as a positive integer
    #[error("Invalid ticket ID: {raw}")]
    Malformed {
        /// Value as received
        raw: String,
    },

    /// ID is well-formed but not an active ticket
    #[error("Ticket ID {id} not found")]
    NotFound {
        /// Requested ticket
        id: u32,
    },
}

impl From<TicketIdError> for TrailsError {
    fn from(err: TicketIdError) -> Self {
        match err {
            TicketIdError::NotFound { id } => Self::not_found("ticket", id),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

/// Outcome of validating a ticket ID
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TicketValidation {
    /// Whether the ID refers to an active ticket
    pub is_valid: bool,
    /// The resolved ID when valid
    pub ticket_id: Option<u32>,
    /// Where to send the traveller when invalid
    pub redirect_path: Option<String>,
    /// User-facing reason when invalid
    pub error_message: Option<String>,
    /// Active ticket IDs to offer when invalid
    pub suggestions: Vec<u32>,
    /// Typed reason when invalid
    #[serde(skip)]
    pub error: Option<TicketIdError>,
}

impl TicketValidation {
    fn valid(ticket_id: u32) -> Self {
        Self {
            is_valid: true,
            ticket_id: Some(ticket_id),
            redirect_path: None,
            error_message: None,
            suggestions: Vec::new(),
            error: None,
        }
    }

    fn invalid(error: TicketIdError, default_id: u32, suggestions: Vec<u32>) -> Self {
        Self {
            is_valid: false,
            ticket_id: None,
            redirect_path: Some(booking_path(default_id)),
            error_message: Some(error.to_string()),
            suggestions,
            error: Some(error),
        }
    }

    /// Convert into a `Result`, discarding redirect data
    ///
    /// # Errors
    ///
    /// Returns the validation failure as a [`TrailsError`].
    pub fn into_result(self) -> Result<u32, TrailsError> {
        match (self.ticket_id, self.error) {
            (Some(id), None) => Ok(id),
            (_, Some(err)) => Err(err.into()),
            (None, None) => Err(TicketIdError::Missing.into()),
        }
    }
}

/// Options passed to a [`Navigator`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
}

/// Something that can move the traveller to another route
pub trait Navigator {
    /// Navigate to `path`
    fn navigate(&mut self, path: &str, options: NavigateOptions);
}

impl<F> Navigator for F
where
    F: FnMut(&str, NavigateOptions),
{
    fn navigate(&mut self, path: &str, options: NavigateOptions) {
        self(path, options);
    }
}

/// Validates route ticket IDs against a registry
#[derive(Debug, Clone)]
pub struct TicketIdValidator<R> {
    registry: R,
}

impl<R: TicketRegistry> TicketIdValidator<R> {
    /// Creates a validator over `registry`
    #[must_use]
    pub const fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The underlying registry
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Active ticket IDs in registry order
    #[must_use]
    pub fn active_ids(&self) -> Vec<u32> {
        active_ids(&self.registry.list())
    }

    /// First active ticket, or [`FALLBACK_TICKET_ID`] if there is none
    #[must_use]
    pub fn default_ticket_id(&self) -> u32 {
        self.active_ids()
            .first()
            .copied()
            .unwrap_or(FALLBACK_TICKET_ID)
    }

    /// Validate a raw ticket ID.
    ///
    /// Reads one registry snapshot, so repeated calls against an unchanged
    /// registry return identical results.
    #[must_use]
    pub fn validate(&self, raw_id: Option<TicketIdInput>) -> TicketValidation {
        self.check(raw_id).0
    }

    /// Validate and, on failure, navigate away from `current_path`.
    ///
    /// Returns `true` without side effects when the ID is valid. Otherwise the
    /// navigator is sent to the rewritten route (replacing the history entry)
    /// and `false` is returned.
    pub fn validate_and_redirect<N: Navigator + ?Sized>(
        &self,
        raw_id: Option<TicketIdInput>,
        current_path: &str,
        navigator: &mut N,
    ) -> bool {
        let (validation, fallback_id) = self.check(raw_id);
        if validation.is_valid {
            return true;
        }

        let target = compute_redirect_path(current_path, fallback_id);
        tracing::info!(
            from = current_path,
            to = %target,
            reason = validation.error_message.as_deref().unwrap_or_default(),
            "Redirecting invalid ticket route"
        );
        navigator.navigate(&target, NavigateOptions { replace: true });
        false
    }

    /// Validation result plus the default ID from the same registry snapshot
    fn check(&self, raw_id: Option<TicketIdInput>) -> (TicketValidation, u32) {
        let active = active_ids(&self.registry.list());
        let default_id = active.first().copied().unwrap_or(FALLBACK_TICKET_ID);

        let checked = raw_id
            .ok_or(TicketIdError::Missing)
            .and_then(|raw| raw.coerce())
            .and_then(|id| {
                if active.contains(&id) {
                    Ok(id)
                } else {
                    Err(TicketIdError::NotFound { id })
                }
            });

        let validation = match checked {
            Ok(id) => TicketValidation::valid(id),
            Err(err) => {
                tracing::debug!(error = %err, default_id, "Ticket ID rejected");
                TicketValidation::invalid(err, default_id, active)
            },
        };
        (validation, default_id)
    }
}

fn active_ids(tickets: &[ValidTicket]) -> Vec<u32> {
    tickets
        .iter()
        .filter(|ticket| ticket.is_active())
        .map(|ticket| ticket.id)
        .collect()
}
