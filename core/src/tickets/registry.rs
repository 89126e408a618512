//! Registry of bookable tickets.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Whether a ticket can currently be booked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Eligible for booking and suggestions
    Active,
    /// Listed but excluded from validation and suggestions
    Inactive,
}

/// A ticket the frontend is allowed to route to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidTicket {
    /// Ticket identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// Booking eligibility
    pub status: TicketStatus,
}

impl ValidTicket {
    /// Creates an active ticket
    #[must_use]
    pub fn active(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: TicketStatus::Active,
        }
    }

    /// Creates an inactive ticket
    #[must_use]
    pub fn inactive(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: TicketStatus::Inactive,
        }
    }

    /// Whether this ticket is eligible for booking
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }
}

/// Source of the current ticket set.
///
/// Injected into the validator so that tests can supply isolated instances.
pub trait TicketRegistry: Send + Sync {
    /// Snapshot of all tickets in registry order
    fn list(&self) -> Vec<ValidTicket>;

    /// Replace the entire ticket set
    fn replace_all(&self, tickets: Vec<ValidTicket>);
}

impl<R: TicketRegistry + ?Sized> TicketRegistry for Arc<R> {
    fn list(&self) -> Vec<ValidTicket> {
        (**self).list()
    }

    fn replace_all(&self, tickets: Vec<ValidTicket>) {
        (**self).replace_all(tickets);
    }
}

/// Process-memory registry; replacement is a single swap under a write lock.
#[derive(Debug, Default)]
pub struct InMemoryTicketRegistry {
    tickets: RwLock<Arc<Vec<ValidTicket>>>,
}

impl InMemoryTicketRegistry {
    /// Creates a registry holding `tickets`
    #[must_use]
    pub fn new(tickets: Vec<ValidTicket>) -> Self {
        Self {
            tickets: RwLock::new(Arc::new(tickets)),
        }
    }

    /// Creates a registry holding the startup seed list
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed_tickets())
    }
}

impl TicketRegistry for InMemoryTicketRegistry {
    fn list(&self) -> Vec<ValidTicket> {
        let guard = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().clone()
    }

    fn replace_all(&self, tickets: Vec<ValidTicket>) {
        let count = tickets.len();
        let mut guard = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(tickets);
        tracing::info!(count, "Ticket registry replaced");
    }
}

/// Tickets known at startup, before the backend list is fetched
#[must_use]
pub fn seed_tickets() -> Vec<ValidTicket> {
    vec![
        ValidTicket::active(1, "Kakum National Park Canopy Walk"),
        ValidTicket::active(2, "Cape Coast Castle Heritage Tour"),
        ValidTicket::active(3, "Mole National Park Safari"),
        ValidTicket::active(4, "Wli Waterfalls Hike"),
        ValidTicket::active(5, "Accra Arts and Food Trail"),
    ]
}
