//! Sample destinations and ticket sets.

use trails_core::money::Money;
use trails_core::pricing::{DestinationPricing, PricingTier};
use trails_core::tickets::{InMemoryTicketRegistry, ValidTicket};

/// Whole cedis as [`Money`], saturating on overflow
#[must_use]
pub fn ghs(cedis: u64) -> Money {
    Money::from_cedis(cedis).unwrap_or(Money::from_pesewas(u64::MAX))
}

/// Two bands: 1-4 at GHS 100, 5+ at GHS 80
#[must_use]
pub fn two_band_tiers() -> Vec<PricingTier> {
    vec![
        PricingTier::new(1, 1, Some(4), ghs(100)),
        PricingTier::new(2, 5, None, ghs(80)),
    ]
}

/// Kakum canopy walk: base GHS 120, up to 20 travellers, two bands
#[must_use]
pub fn kakum_pricing() -> DestinationPricing {
    DestinationPricing {
        base_price: ghs(120),
        max_group_size: 20,
        has_tiered_pricing: true,
        tiers: two_band_tiers(),
    }
}

/// Registry with tickets 1 and 2 active
#[must_use]
pub fn two_ticket_registry() -> InMemoryTicketRegistry {
    InMemoryTicketRegistry::new(vec![
        ValidTicket::active(1, "Kakum National Park Canopy Walk"),
        ValidTicket::active(2, "Cape Coast Castle Heritage Tour"),
    ])
}
