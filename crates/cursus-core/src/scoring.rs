//! Stability index rules.
//!
//! Two rules are applied every tick, both additive:
//!
//! 1. **Vacancy**: for each tier, `penalty * (quota - occupancy)`. The rule
//!    is symmetric, so an over-quota tier has a negative shortfall and
//!    raises the index.
//! 2. **Consecutive reelection**: on years where
//!    `year % years_between_consul_reelection == 0` (year 0 included),
//!    `penalty * (consul quota - consul occupancy)`.
//!
//! The two rules may count Consuls over different bands (see
//! [`ConsulBand`](crate::config::ConsulBand)). Neither rule mutates the
//! population.

use std::collections::BTreeMap;

use cursus_types::{AgeBand, Tier};

use crate::config::{SimulationConfig, TierConfig};
use crate::population::Population;

/// Errors that can occur while scoring a tick.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// A shortfall or index delta left the `i64` range.
    #[error("arithmetic overflow in scoring: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

fn overflow(context: &str) -> ScoringError {
    ScoringError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

/// Outcome of the vacancy rule for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyAssessment {
    /// `quota - occupancy` per tier. Negative means over quota.
    pub shortfalls: BTreeMap<Tier, i64>,
    /// Total contribution to the stability index.
    pub delta: i64,
}

/// Computes per-tick stability index deltas from population state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringEngine {
    tiers: TierConfig,
    unfilled_position_penalty: i64,
    reelection_penalty: i64,
    reelection_period: u32,
    vacancy_consul_band: AgeBand,
    reelection_consul_band: AgeBand,
}

impl ScoringEngine {
    /// Build the scoring rules from a configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            tiers: config.tiers.clone(),
            unfilled_position_penalty: config.scoring.unfilled_position_penalty,
            reelection_penalty: config.scoring.consecutive_consul_reelection_penalty,
            reelection_period: config.scoring.years_between_consul_reelection,
            vacancy_consul_band: config.vacancy_consul_band(),
            reelection_consul_band: config.reelection_consul_band(),
        }
    }

    /// Band the vacancy rule counts for `tier`.
    pub const fn vacancy_band(&self, tier: Tier) -> AgeBand {
        match tier {
            Tier::Consul => self.vacancy_consul_band,
            Tier::Quaestor | Tier::Aedile | Tier::Praetor => self.tiers.band(tier),
        }
    }

    /// Band the reelection rule counts.
    pub const fn reelection_band(&self) -> AgeBand {
        self.reelection_consul_band
    }

    /// Apply the vacancy rule to the current population.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::ArithmeticOverflow`] if a shortfall or the
    /// summed delta does not fit in `i64`.
    pub fn assess_vacancies(
        &self,
        population: &Population,
    ) -> Result<VacancyAssessment, ScoringError> {
        let mut shortfalls = BTreeMap::new();
        let mut delta: i64 = 0;
        for tier in Tier::ALL {
            let occupancy = population.count_in_range(self.vacancy_band(tier));
            let gap = shortfall(self.tiers.quota(tier), occupancy)?;
            let contribution = self
                .unfilled_position_penalty
                .checked_mul(gap)
                .ok_or_else(|| overflow("vacancy penalty"))?;
            delta = delta
                .checked_add(contribution)
                .ok_or_else(|| overflow("vacancy delta sum"))?;
            shortfalls.insert(tier, gap);
        }
        Ok(VacancyAssessment { shortfalls, delta })
    }

    /// Whether the reelection rule fires in `year`.
    pub const fn is_reelection_year(&self, year: u32) -> bool {
        match year.checked_rem(self.reelection_period) {
            Some(rem) => rem == 0,
            None => false,
        }
    }

    /// Apply the reelection rule, or `None` if `year` is not a reelection
    /// year.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::ArithmeticOverflow`] if the delta does not
    /// fit in `i64`.
    pub fn assess_reelection(
        &self,
        year: u32,
        population: &Population,
    ) -> Result<Option<i64>, ScoringError> {
        if !self.is_reelection_year(year) {
            return Ok(None);
        }
        let occupancy = population.count_in_range(self.reelection_consul_band);
        let gap = shortfall(self.tiers.quota(Tier::Consul), occupancy)?;
        self.reelection_penalty
            .checked_mul(gap)
            .map(Some)
            .ok_or_else(|| overflow("reelection penalty"))
    }
}

/// `quota - occupancy` as a signed value.
fn shortfall(quota: u32, occupancy: usize) -> Result<i64, ScoringError> {
    let occupancy = i64::try_from(occupancy).map_err(|_err| overflow("occupancy count"))?;
    i64::from(quota)
        .checked_sub(occupancy)
        .ok_or_else(|| overflow("shortfall"))
}

/// Add `delta` to the running index.
///
/// # Errors
///
/// Returns [`ScoringError::ArithmeticOverflow`] if the index leaves the
/// `i64` range.
pub fn accumulate(index: i64, delta: i64) -> Result<i64, ScoringError> {
    index
        .checked_add(delta)
        .ok_or_else(|| overflow("stability index"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::config::ConsulBand;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(&SimulationConfig::default())
    }

    /// Population with `a` Quaestors, `b` Aediles, `c` Praetors and
    /// `d` Consuls, each at the tier's minimum age.
    fn staffed(a: usize, b: usize, c: usize, d: usize) -> Population {
        let mut population = Population::new();
        population.recruit(a, 30);
        population.recruit(b, 36);
        population.recruit(c, 39);
        population.recruit(d, 42);
        population
    }

    #[test]
    fn fully_staffed_has_zero_vacancy_delta() {
        let assessment = engine().assess_vacancies(&staffed(20, 10, 8, 2)).unwrap();
        assert_eq!(assessment.delta, 0);
        assert!(assessment.shortfalls.values().all(|&s| s == 0));
    }

    #[test]
    fn vacancy_delta_matches_formula() {
        let cases = [(0, 0, 0, 0), (20, 10, 8, 2), (5, 3, 9, 0), (25, 12, 1, 7)];
        for (a, b, c, d) in cases {
            let assessment = engine().assess_vacancies(&staffed(a, b, c, d)).unwrap();
            let [a, b, c, d] = [a, b, c, d].map(|n| i64::try_from(n).unwrap());
            let expected = -5 * ((20 - a) + (10 - b) + (8 - c) + (2 - d));
            assert_eq!(assessment.delta, expected, "counts ({a}, {b}, {c}, {d})");
        }
    }

    #[test]
    fn empty_population_is_fully_penalized() {
        let assessment = engine().assess_vacancies(&Population::new()).unwrap();
        assert_eq!(assessment.delta, -200);
        assert_eq!(assessment.shortfalls.get(&Tier::Quaestor), Some(&20));
    }

    #[test]
    fn over_quota_raises_index() {
        let assessment = engine().assess_vacancies(&staffed(30, 10, 8, 2)).unwrap();
        assert_eq!(assessment.shortfalls.get(&Tier::Quaestor), Some(&-10));
        assert_eq!(assessment.delta, 50);
    }

    #[test]
    fn vacancy_rule_ignores_consuls_at_or_above_life_expectancy_mean() {
        let population = Population::from_ages([42, 54, 55, 70]);
        let assessment = engine().assess_vacancies(&population).unwrap();
        // Only 42 and 54 are counted: Consul shortfall is 0.
        assert_eq!(assessment.shortfalls.get(&Tier::Consul), Some(&0));
    }

    #[test]
    fn reelection_rule_counts_every_consul() {
        let engine = engine();
        assert_eq!(engine.reelection_band(), AgeBand::open_ended(42));
        assert_eq!(engine.vacancy_band(Tier::Consul), AgeBand::bounded(42, 55));
        let population = Population::from_ages([42, 54, 55, 70]);
        // Open-ended band: 4 Consuls against a quota of 2.
        assert_eq!(engine.assess_reelection(0, &population).unwrap(), Some(20));
    }

    #[test]
    fn reelection_rule_can_use_capped_band() {
        let mut config = SimulationConfig::default();
        config.scoring.reelection_consul_band = ConsulBand::Capped;
        let engine = ScoringEngine::new(&config);
        let population = Population::from_ages([42, 54, 55, 70]);
        assert_eq!(engine.assess_reelection(0, &population).unwrap(), Some(0));
    }

    #[test]
    fn reelection_fires_on_multiples_of_period_only() {
        let engine = engine();
        let population = Population::new();
        assert_eq!(engine.assess_reelection(0, &population).unwrap(), Some(-20));
        assert_eq!(engine.assess_reelection(7, &population).unwrap(), None);
        assert_eq!(engine.assess_reelection(10, &population).unwrap(), Some(-20));
        assert_eq!(engine.assess_reelection(190, &population).unwrap(), Some(-20));
    }

    #[test]
    fn reelection_fires_twenty_times_in_two_hundred_years() {
        let engine = engine();
        let fired = (0..200).filter(|&y| engine.is_reelection_year(y)).count();
        assert_eq!(fired, 20);
    }

    #[test]
    fn scoring_does_not_mutate_population() {
        let population = Population::from_ages([30, 36, 42, 60]);
        let before = population.clone();
        let engine = engine();
        let _ = engine.assess_vacancies(&population).unwrap();
        let _ = engine.assess_reelection(0, &population).unwrap();
        assert_eq!(population, before);
    }

    #[test]
    fn accumulate_detects_overflow() {
        assert_eq!(accumulate(100, -35).unwrap(), 65);
        assert!(matches!(
            accumulate(i64::MAX, 1),
            Err(ScoringError::ArithmeticOverflow { .. })
        ));
    }
}
