//! Booking quotes with selectable add-ons.
//!
//! Combines the tiered per-person price for a group with any extras the
//! travellers pick (meals, transport, a private guide). Add-ons are charged
//! either per traveller or once per booking.

use crate::error::{Result, TrailsError};
use crate::money::Money;
use crate::pricing::{DestinationPricing, PriceQuote};
use serde::{Deserialize, Serialize};

/// How an add-on's price scales with the group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnCharge {
    /// Price is multiplied by the group size
    PerPerson,
    /// Price is charged once
    PerBooking,
}

/// An optional extra offered with a destination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    /// Add-on identifier assigned by the backend
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Charging basis
    pub charge: AddOnCharge,
}

impl AddOn {
    /// Cost of this add-on for a group of `group_size`
    ///
    /// # Errors
    ///
    /// Returns [`TrailsError::InvalidArgument`] if the total overflows.
    pub fn cost_for(&self, group_size: u32) -> Result<Money> {
        match self.charge {
            AddOnCharge::PerBooking => Ok(self.price),
            AddOnCharge::PerPerson => self
                .price
                .checked_multiply(group_size)
                .ok_or_else(|| overflow(&self.name)),
        }
    }
}

/// Full price breakdown for a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingQuote {
    /// Number of travellers
    pub group_size: u32,
    /// Resolved per-person price
    pub price: PriceQuote,
    /// Per-person price times group size
    pub subtotal: Money,
    /// Sum of all selected add-ons
    pub add_ons_total: Money,
    /// Amount to charge at checkout
    pub total: Money,
    /// Savings across the whole group versus the base price
    pub total_savings: Money,
}

/// Quote a booking for `group_size` travellers with the selected add-ons.
///
/// # Errors
///
/// Returns [`TrailsError::InvalidArgument`] if the group size is invalid for
/// the destination or any total overflows.
pub fn quote_booking(
    pricing: &DestinationPricing,
    group_size: u32,
    add_ons: &[AddOn],
) -> Result<BookingQuote> {
    let price = pricing.resolve(group_size)?;

    let subtotal = price
        .price_per_person
        .checked_multiply(group_size)
        .ok_or_else(|| overflow("subtotal"))?;

    let add_ons_total = add_ons.iter().try_fold(Money::ZERO, |acc, add_on| {
        acc.checked_add(add_on.cost_for(group_size)?)
            .ok_or_else(|| overflow("add-ons"))
    })?;

    let total = subtotal
        .checked_add(add_ons_total)
        .ok_or_else(|| overflow("total"))?;

    let total_savings = price
        .savings_per_person
        .checked_multiply(group_size)
        .ok_or_else(|| overflow("savings"))?;

    tracing::debug!(
        group_size,
        subtotal = %subtotal,
        add_ons = add_ons.len(),
        total = %total,
        "Booking quoted"
    );

    Ok(BookingQuote {
        group_size,
        price,
        subtotal,
        add_ons_total,
        total,
        total_savings,
    })
}

fn overflow(what: &str) -> TrailsError {
    TrailsError::invalid(format!("{what} amount overflows"))
}
