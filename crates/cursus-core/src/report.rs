//! Post-run aggregates for the reporting layer.
//!
//! Classification here always uses the open-ended Consul band, matching the
//! reelection rule, not the capped band of the vacancy rule.

use std::collections::BTreeMap;

use cursus_types::{AgeDistribution, FillRate, Tier, TierSummary};

use crate::config::TierConfig;
use crate::population::Population;

/// Classify every individual into a tier and summarize count and mean age.
///
/// Read-only: calling it twice on the same population gives the same
/// result.
pub fn age_distribution(population: &Population, tiers: &TierConfig) -> AgeDistribution {
    let mut totals: BTreeMap<Tier, (u64, u64)> =
        Tier::ALL.into_iter().map(|tier| (tier, (0, 0))).collect();
    let mut unclassified: u64 = 0;

    for individual in population.iter() {
        let age = individual.age();
        match tiers.classify(age).and_then(|tier| totals.get_mut(&tier)) {
            Some((count, total_age)) => {
                *count = count.saturating_add(1);
                *total_age = total_age.saturating_add(u64::from(age));
            }
            None => unclassified = unclassified.saturating_add(1),
        }
    }

    AgeDistribution {
        tiers: totals
            .into_iter()
            .map(|(tier, (count, total_age))| (tier, TierSummary::from_totals(count, total_age)))
            .collect(),
        unclassified,
    }
}

/// Each tier's quota as a percentage of the horizon.
///
/// Depends only on configuration. `total_years` of zero yields zero
/// percentages.
pub fn fill_rates(tiers: &TierConfig, total_years: u32) -> BTreeMap<Tier, FillRate> {
    Tier::ALL
        .into_iter()
        .map(|tier| {
            let quota = tiers.quota(tier);
            let percent = if total_years == 0 {
                0.0
            } else {
                f64::from(quota) / f64::from(total_years) * 100.0
            };
            (tier, FillRate { quota, percent })
        })
        .collect()
}
