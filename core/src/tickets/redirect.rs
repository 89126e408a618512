//! Route rewriting for unknown ticket IDs.

/// Route prefixes that carry a ticket ID
const TICKET_ROUTE_PREFIXES: [&str; 3] = ["/ticket-booking/", "/booking/", "/tickets/"];

/// Generic ticket listing route
pub const TICKET_LISTING_PATH: &str = "/tickets";

/// Booking route for `ticket_id`
#[must_use]
pub fn booking_path(ticket_id: u32) -> String {
    format!("/booking/{ticket_id}")
}

/// Rewrite `current_path` so that it points at `fallback_id`.
///
/// - `/booking/{x}`, `/ticket-booking/{x}` and `/tickets/{x}` keep their prefix
///   and swap the ID.
/// - The ticket index (`/tickets` or `/tickets/`) routes to the listing.
/// - Anything else goes to `/booking/{fallback_id}`.
#[must_use]
pub fn compute_redirect_path(current_path: &str, fallback_id: u32) -> String {
    let path = current_path.split(['?', '#']).next().unwrap_or_default();

    if path == TICKET_LISTING_PATH || path == "/tickets/" {
        return TICKET_LISTING_PATH.to_string();
    }

    TICKET_ROUTE_PREFIXES
        .iter()
        .find(|prefix| path.starts_with(**prefix))
        .map_or_else(
            || booking_path(fallback_id),
            |prefix| format!("{prefix}{fallback_id}"),
        )
}
