//! Group-size tiered pricing.
//!
//! A destination has a base per-person price and, optionally, a set of tiers
//! that each cover a contiguous band of group sizes. Resolution picks the
//! first tier (in ascending `min_people` order) whose band contains the
//! requested group size; if none does, the base price applies.
//!
//! # Example
//!
//! ```
//! use trails_core::money::Money;
//! use trails_core::pricing::{resolve_price, PricingTier};
//!
//! let base = Money::from_pesewas(12_000);
//! let tiers = vec![
//!     PricingTier::new(1, 1, Some(4), Money::from_pesewas(10_000)),
//!     PricingTier::new(2, 5, None, Money::from_pesewas(8_000)),
//! ];
//!
//! let quote = resolve_price(base, &tiers, 10).unwrap();
//! assert_eq!(quote.price_per_person, Money::from_pesewas(8_000));
//! assert!(quote.is_discounted);
//! assert_eq!(quote.savings_per_person, Money::from_pesewas(4_000));
//! ```

use crate::error::{Result, TrailsError};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A contiguous group-size band with its own per-person price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Tier identifier assigned by the backend
    pub id: u64,
    /// Smallest group size covered (inclusive)
    pub min_people: u32,
    /// Largest group size covered (inclusive); `None` means open-ended
    pub max_people: Option<u32>,
    /// Price charged per person within this band
    pub price_per_person: Money,
}

impl PricingTier {
    /// Creates a new tier
    #[must_use]
    pub const fn new(
        id: u64,
        min_people: u32,
        max_people: Option<u32>,
        price_per_person: Money,
    ) -> Self {
        Self {
            id,
            min_people,
            max_people,
            price_per_person,
        }
    }

    /// Whether this tier's band contains `group_size`
    #[must_use]
    pub fn covers(&self, group_size: u32) -> bool {
        group_size >= self.min_people && self.max_people.is_none_or(|max| group_size <= max)
    }
}

/// Effective per-person price for one group size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price each traveller pays
    pub price_per_person: Money,
    /// Whether the price is below the destination's base price
    pub is_discounted: bool,
    /// Base price minus tier price; zero when not discounted
    pub savings_per_person: Money,
}

impl PriceQuote {
    /// Quote at the base price with no discount
    #[must_use]
    pub const fn base(base_price: Money) -> Self {
        Self {
            price_per_person: base_price,
            is_discounted: false,
            savings_per_person: Money::ZERO,
        }
    }

    fn from_tier(base_price: Money, tier_price: Money) -> Self {
        match base_price.checked_sub(tier_price) {
            Some(savings) if !savings.is_zero() => Self {
                price_per_person: tier_price,
                is_discounted: true,
                savings_per_person: savings,
            },
            _ => Self::base(tier_price),
        }
    }
}

/// Pricing configuration for a single destination.
///
/// Fetched fresh from the backend per pricing query and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPricing {
    /// Per-person price when no tier applies
    pub base_price: Money,
    /// Largest group the destination accepts
    pub max_group_size: u32,
    /// When false, tiers are ignored entirely
    pub has_tiered_pricing: bool,
    /// Group-size tiers, in any order
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
}

impl DestinationPricing {
    /// Resolve the per-person price for `group_size`.
    ///
    /// # Errors
    ///
    /// Returns [`TrailsError::InvalidArgument`] if `group_size` is zero or
    /// exceeds `max_group_size`.
    pub fn resolve(&self, group_size: u32) -> Result<PriceQuote> {
        if group_size > self.max_group_size {
            return Err(TrailsError::invalid(format!(
                "group size {group_size} exceeds the maximum of {}",
                self.max_group_size
            )));
        }
        resolve_price(self.base_price, self.active_tiers(), group_size)
    }

    /// Every selectable group size for this destination, from 1 to `max_group_size`.
    #[must_use]
    pub fn group_size_options(&self) -> GroupSizeOptions {
        generate_group_size_options(self.base_price, self.active_tiers(), self.max_group_size)
    }

    fn active_tiers(&self) -> &[PricingTier] {
        if self.has_tiered_pricing {
            &self.tiers
        } else {
            &[]
        }
    }
}

/// Resolve the effective per-person price for a group.
///
/// Tiers may be given in any order; the first tier covering `group_size` in
/// ascending `min_people` order wins. An empty tier list yields the base price.
///
/// # Errors
///
/// Returns [`TrailsError::InvalidArgument`] if `group_size` is zero.
pub fn resolve_price(base_price: Money, tiers: &[PricingTier], group_size: u32) -> Result<PriceQuote> {
    if group_size == 0 {
        return Err(TrailsError::invalid("group size must be at least 1"));
    }
    Ok(resolve_sorted(base_price, &sorted_tiers(tiers), group_size))
}

fn sorted_tiers(tiers: &[PricingTier]) -> Vec<PricingTier> {
    let mut sorted = tiers.to_vec();
    // Stable sort keeps input order among equal minimums
    sorted.sort_by_key(|tier| tier.min_people);
    sorted
}

fn resolve_sorted(base_price: Money, sorted: &[PricingTier], group_size: u32) -> PriceQuote {
    sorted
        .iter()
        .find(|tier| tier.covers(group_size))
        .map_or_else(
            || PriceQuote::base(base_price),
            |tier| PriceQuote::from_tier(base_price, tier.price_per_person),
        )
}

/// One entry in a group-size picker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSizeOption {
    /// Number of travellers
    pub size: u32,
    /// Human-readable label, e.g. `"5 people - save GHS 40.00/person"`
    pub label: String,
    /// Per-person price at this size
    pub price: Money,
    /// Whether `price` is below the base price
    pub is_discounted: bool,
    /// Per-person savings against the base price
    pub savings: Money,
}

/// Lazy iterator over group sizes `1..=max_group_size`.
///
/// Cloning yields an independent iterator positioned at the same size, so the
/// sequence can be restarted by cloning before consumption.
#[derive(Clone, Debug)]
pub struct GroupSizeOptions {
    base_price: Money,
    tiers: Vec<PricingTier>,
    sizes: std::ops::RangeInclusive<u32>,
}

impl Iterator for GroupSizeOptions {
    type Item = GroupSizeOption;

    fn next(&mut self) -> Option<Self::Item> {
        let size = self.sizes.next()?;
        let quote = resolve_sorted(self.base_price, &self.tiers, size);
        Some(GroupSizeOption {
            size,
            label: option_label(size, &quote),
            price: quote.price_per_person,
            is_discounted: quote.is_discounted,
            savings: quote.savings_per_person,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sizes.size_hint()
    }
}

impl ExactSizeIterator for GroupSizeOptions {}

/// Build the picker entries for every group size from 1 to `max_group_size`.
///
/// Each entry is priced exactly as [`resolve_price`] would price it. A
/// `max_group_size` of zero yields an empty sequence.
#[must_use]
pub fn generate_group_size_options(
    base_price: Money,
    tiers: &[PricingTier],
    max_group_size: u32,
) -> GroupSizeOptions {
    GroupSizeOptions {
        base_price,
        tiers: sorted_tiers(tiers),
        sizes: 1..=max_group_size,
    }
}

fn option_label(size: u32, quote: &PriceQuote) -> String {
    let people = if size == 1 {
        "1 person".to_string()
    } else {
        format!("{size} people")
    };
    if quote.is_discounted {
        format!("{people} - save {}/person", quote.savings_per_person)
    } else {
        people
    }
}

/// A defect found in a tier set
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TierIssue {
    /// Group sizes `from..=to` are not covered by any tier
    Gap {
        /// First uncovered size
        from: u32,
        /// Last uncovered size
        to: u32,
    },
    /// Two tiers both cover `size`
    Overlap {
        /// First size covered twice
        size: u32,
        /// Tier that wins resolution
        winner: u64,
        /// Tier that is shadowed
        shadowed: u64,
    },
    /// A tier's maximum is below its minimum
    EmptyBand {
        /// Offending tier
        tier: u64,
    },
}

/// Check a tier set against the coverage invariant for sizes `1..=max_group_size`.
///
/// Resolution still works on a defective set (the first match wins), so these
/// are diagnostics for whoever maintains destination data.
#[must_use]
pub fn validate_tiers(tiers: &[PricingTier], max_group_size: u32) -> Vec<TierIssue> {
    let sorted = sorted_tiers(tiers);
    let mut issues = Vec::new();

    for tier in &sorted {
        if tier.max_people.is_some_and(|max| max < tier.min_people) {
            issues.push(TierIssue::EmptyBand { tier: tier.id });
        }
    }

    for (index, tier) in sorted.iter().enumerate() {
        let earlier = &sorted[..index];
        let first_shared = earlier
            .iter()
            .map(|other| other.min_people.max(tier.min_people))
            .filter(|&size| tier.covers(size) && earlier.iter().any(|other| other.covers(size)))
            .min();
        let overlap = first_shared.and_then(|size| {
            earlier
                .iter()
                .find(|other| other.covers(size))
                .map(|winner| TierIssue::Overlap {
                    size,
                    winner: winner.id,
                    shadowed: tier.id,
                })
        });
        issues.extend(overlap);
    }

    let mut gap_start: Option<u32> = None;
    for size in 1..=max_group_size {
        let covered = sorted.iter().any(|tier| tier.covers(size));
        match (covered, gap_start) {
            (false, None) => gap_start = Some(size),
            (true, Some(from)) => {
                issues.push(TierIssue::Gap { from, to: size - 1 });
                gap_start = None;
            },
            _ => {},
        }
    }
    if let Some(from) = gap_start {
        issues.push(TierIssue::Gap {
            from,
            to: max_group_size,
        });
    }

    issues
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn ghs(cedis: u64) -> Money {
        Money::from_cedis(cedis).unwrap()
    }

    fn two_band_tiers() -> Vec<PricingTier> {
        vec![
            PricingTier::new(1, 1, Some(4), ghs(100)),
            PricingTier::new(2, 5, None, ghs(80)),
        ]
    }

    #[test]
    fn test_small_group_gets_first_band() {
        let quote = resolve_price(ghs(120), &two_band_tiers(), 3).unwrap();
        assert_eq!(quote.price_per_person, ghs(100));
        assert!(quote.is_discounted);
        assert_eq!(quote.savings_per_person, ghs(20));
    }

    #[test]
    fn test_large_group_gets_open_ended_band() {
        let quote = resolve_price(ghs(120), &two_band_tiers(), 10).unwrap();
        assert_eq!(quote.price_per_person, ghs(80));
        assert!(quote.is_discounted);
        assert_eq!(quote.savings_per_person, ghs(40));
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let tiers = two_band_tiers();
        assert_eq!(resolve_price(ghs(120), &tiers, 4).unwrap().price_per_person, ghs(100));
        assert_eq!(resolve_price(ghs(120), &tiers, 5).unwrap().price_per_person, ghs(80));
    }

    #[test]
    fn test_no_matching_tier_falls_back_to_base() {
        let tiers = vec![PricingTier::new(1, 6, Some(10), ghs(90))];
        let quote = resolve_price(ghs(120), &tiers, 2).unwrap();
        assert_eq!(quote, PriceQuote::base(ghs(120)));
    }

    #[test]
    fn test_unsorted_tiers_resolve_in_min_people_order() {
        let tiers = vec![
            PricingTier::new(9, 3, None, ghs(70)),
            PricingTier::new(8, 1, Some(5), ghs(110)),
        ];
        // Both cover 4; the band starting at 1 wins
        let quote = resolve_price(ghs(120), &tiers, 4).unwrap();
        assert_eq!(quote.price_per_person, ghs(110));
    }

    #[test]
    fn test_tier_above_base_is_used_but_not_discounted() {
        let tiers = vec![PricingTier::new(1, 1, None, ghs(150))];
        let quote = resolve_price(ghs(120), &tiers, 2).unwrap();
        assert_eq!(quote.price_per_person, ghs(150));
        assert!(!quote.is_discounted);
        assert_eq!(quote.savings_per_person, Money::ZERO);
    }

    #[test]
    fn test_zero_group_size_is_rejected() {
        let err = resolve_price(ghs(120), &two_band_tiers(), 0).unwrap_err();
        assert!(matches!(err, TrailsError::InvalidArgument(_)));
    }

    #[test]
    fn test_destination_ignores_tiers_when_disabled() {
        let pricing = DestinationPricing {
            base_price: ghs(120),
            max_group_size: 12,
            has_tiered_pricing: false,
            tiers: two_band_tiers(),
        };
        assert_eq!(pricing.resolve(10).unwrap(), PriceQuote::base(ghs(120)));
        assert!(pricing.group_size_options().all(|option| !option.is_discounted));
    }

    #[test]
    fn test_destination_rejects_oversized_groups() {
        let pricing = DestinationPricing {
            base_price: ghs(120),
            max_group_size: 12,
            has_tiered_pricing: true,
            tiers: two_band_tiers(),
        };
        assert_ok!(pricing.resolve(12));
        assert_err!(pricing.resolve(13));
    }

    #[test]
    fn test_destination_deserializes_backend_payload() {
        let json = r#"{
            "base_price": "120.00",
            "max_group_size": 15,
            "has_tiered_pricing": true,
            "tiers": [
                {"id": 2, "min_people": 5, "max_people": null, "price_per_person": "80.00"},
                {"id": 1, "min_people": 1, "max_people": 4, "price_per_person": "100.00"}
            ]
        }"#;
        let pricing: DestinationPricing = serde_json::from_str(json).unwrap();
        assert_eq!(pricing.resolve(6).unwrap().price_per_person, ghs(80));
    }

    #[test]
    fn test_group_size_options_labels() {
        let options: Vec<_> = generate_group_size_options(ghs(120), &two_band_tiers(), 6).collect();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].label, "1 person - save GHS 20.00/person");
        assert_eq!(options[5].label, "6 people - save GHS 40.00/person");

        let plain: Vec<_> = generate_group_size_options(ghs(120), &[], 2).collect();
        assert_eq!(plain[0].label, "1 person");
        assert_eq!(plain[1].label, "2 people");
    }

    #[test]
    fn test_group_size_options_are_restartable() {
        let options = generate_group_size_options(ghs(120), &two_band_tiers(), 8);
        assert_eq!(options.len(), 8);
        let first_pass: Vec<_> = options.clone().collect();
        let second_pass: Vec<_> = options.collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(generate_group_size_options(ghs(120), &[], 0).count(), 0);
    }

    #[test]
    fn test_validate_tiers_reports_gaps_and_overlaps() {
        assert!(validate_tiers(&two_band_tiers(), 20).is_empty());

        let tiers = vec![
            PricingTier::new(1, 1, Some(3), ghs(100)),
            PricingTier::new(2, 3, Some(5), ghs(90)),
            PricingTier::new(3, 8, Some(10), ghs(80)),
            PricingTier::new(4, 12, Some(11), ghs(70)),
        ];
        let issues = validate_tiers(&tiers, 12);
        assert!(issues.contains(&TierIssue::Overlap { size: 3, winner: 1, shadowed: 2 }));
        assert!(issues.contains(&TierIssue::Gap { from: 6, to: 7 }));
        assert!(issues.contains(&TierIssue::Gap { from: 11, to: 12 }));
        assert!(issues.contains(&TierIssue::EmptyBand { tier: 4 }));

        // A wide first band shadows every narrower band inside it
        let tiers = vec![
            PricingTier::new(1, 1, Some(10), ghs(100)),
            PricingTier::new(2, 2, Some(3), ghs(90)),
            PricingTier::new(3, 4, Some(5), ghs(80)),
        ];
        assert_eq!(
            validate_tiers(&tiers, 10),
            vec![
                TierIssue::Overlap { size: 2, winner: 1, shadowed: 2 },
                TierIssue::Overlap { size: 4, winner: 1, shadowed: 3 },
            ]
        );
    }
}
