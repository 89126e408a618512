//! Property-based testing utilities using proptest.

use proptest::prelude::*;
use trails_core::money::Money;
use trails_core::pricing::PricingTier;

/// Per-person prices between GHS 1.00 and GHS 5,000.00
pub fn money() -> impl Strategy<Value = Money> {
    (100_u64..=500_000).prop_map(Money::from_pesewas)
}

/// A gap-free, non-overlapping tier set covering `1..=max_group_size`.
///
/// Produces one to five bands; the last band is open-ended half of the time.
/// Tiers are returned in shuffled order so callers exercise sorting.
pub fn contiguous_tiers(max_group_size: u32) -> impl Strategy<Value = Vec<PricingTier>> {
    let max = max_group_size.max(1);
    let cut_count = max.saturating_sub(1).min(4) as usize;

    (
        proptest::collection::btree_set(2..=max.max(2), 0..=cut_count),
        proptest::collection::vec(money(), 5),
        any::<bool>(),
    )
        .prop_map(move |(cuts, prices, open_ended)| {
            let mut starts: Vec<u32> = std::iter::once(1)
                .chain(cuts.into_iter().filter(|cut| *cut <= max))
                .collect();
            starts.dedup();

            let mut tiers: Vec<PricingTier> = starts
                .iter()
                .enumerate()
                .map(|(index, start)| {
                    let end = starts.get(index + 1).map_or(max, |next| next - 1);
                    PricingTier::new(index as u64 + 1, *start, Some(end), prices[index % prices.len()])
                })
                .collect();

            if open_ended {
                if let Some(last) = tiers.last_mut() {
                    last.max_people = None;
                }
            }
            tiers
        })
        .prop_shuffle()
}
