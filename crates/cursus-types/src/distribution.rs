//! Post-run summaries read by the reporting layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Head count and mean age of the individuals classified into one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    /// Number of individuals in the tier.
    pub count: u64,
    /// Mean age of those individuals, `0.0` when the tier is empty.
    pub average_age: f64,
}

impl TierSummary {
    /// Build a summary from a head count and the sum of their ages.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_totals(count: u64, total_age: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        // Populations stay far below 2^52, so the conversion is exact.
        let average_age = total_age as f64 / count as f64;
        Self { count, average_age }
    }
}

/// Survivors grouped by tier.
///
/// Every tier is always present, possibly with a zero count. Individuals
/// younger than the most junior tier are tallied in `unclassified`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeDistribution {
    /// Per-tier summaries in seniority order.
    pub tiers: BTreeMap<Tier, TierSummary>,
    /// Individuals that fall below every tier band.
    pub unclassified: u64,
}

impl AgeDistribution {
    /// Summary for a single tier (zero when absent).
    pub fn get(&self, tier: Tier) -> TierSummary {
        self.tiers.get(&tier).copied().unwrap_or_default()
    }

    /// Total number of classified individuals across all tiers.
    pub fn classified(&self) -> u64 {
        self.tiers
            .values()
            .fold(0_u64, |acc, s| acc.saturating_add(s.count))
    }
}

/// A tier's annual quota expressed against the simulated horizon.
///
/// `percent` is `quota / total_years * 100`. It depends only on
/// configuration, never on runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillRate {
    /// Positions per year for the tier.
    pub quota: u32,
    /// The quota as a percentage of the simulated years.
    pub percent: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_zero_average() {
        let s = TierSummary::from_totals(0, 0);
        assert_eq!(s.count, 0);
        assert_eq!(s.average_age, 0.0);
    }

    #[test]
    fn average_is_total_over_count() {
        let s = TierSummary::from_totals(4, 130);
        assert_eq!(s.count, 4);
        assert!((s.average_age - 32.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_tier_reads_as_zero() {
        let dist = AgeDistribution::default();
        assert_eq!(dist.get(Tier::Consul).count, 0);
        assert_eq!(dist.classified(), 0);
    }

    #[test]
    fn distribution_serializes_with_tier_keys() {
        let mut dist = AgeDistribution::default();
        dist.tiers.insert(Tier::Aedile, TierSummary::from_totals(2, 74));
        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(json["tiers"]["aedile"]["count"], 2);
        assert_eq!(json["unclassified"], 0);
    }
}
