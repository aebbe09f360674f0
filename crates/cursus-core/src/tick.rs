//! Tick cycle: one simulated year.
//!
//! Each tick runs these steps in order:
//!
//! 1. **Recruit** -- draw the annual influx and append that many recruits
//!    at the Quaestor minimum age. A negative draw recruits nobody.
//! 2. **Shuffle** -- permute the population (when enabled). Counts never
//!    depend on order; the shuffle only consumes entropy.
//! 3. **Age** -- every individual gets one year older.
//! 4. **Cull** -- one life expectancy draw per individual; those strictly
//!    older than their draw are removed.
//! 5. **Vacancy** -- apply the vacancy rule.
//! 6. **Reelection** -- apply the reelection rule on reelection years.
//! 7. **Advance** -- close the year on the clock.
//!
//! Recruits are shuffled, aged and exposed to mortality in the same tick
//! they arrive. The cycle is deterministic given the random source.

use std::collections::BTreeMap;

use cursus_types::Tier;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::population::{Population, PopulationError};
use crate::random::RandomSource;
use crate::scoring::{self, ScoringEngine, ScoringError};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed (including ticking a finished run).
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A population transition failed.
    #[error("population error in year {year}: {source}")]
    Population {
        /// The year being simulated.
        year: u32,
        /// The underlying population error.
        source: PopulationError,
    },

    /// Scoring failed.
    #[error("scoring error in year {year}: {source}")]
    Scoring {
        /// The year being simulated.
        year: u32,
        /// The underlying scoring error.
        source: ScoringError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The year that was executed.
    pub year: u32,
    /// Raw influx draw, possibly negative.
    pub influx: i64,
    /// Recruits actually added.
    pub recruited: usize,
    /// Individuals removed by the mortality check.
    pub deaths: usize,
    /// Population size at end of tick.
    pub population: usize,
    /// Per-tier shortfalls seen by the vacancy rule.
    pub shortfalls: BTreeMap<Tier, i64>,
    /// Contribution of the vacancy rule.
    pub vacancy_delta: i64,
    /// Contribution of the reelection rule, if it fired this year.
    pub reelection_delta: Option<i64>,
    /// Stability index after this tick.
    pub stability_index: i64,
}

/// The mutable simulation state passed through the tick cycle.
///
/// Owned exclusively by one run. Nothing reads the stability index to
/// change population behavior.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The year counter.
    pub clock: SimulationClock,
    /// Current officeholders.
    pub population: Population,
    /// Running stability index. Unbounded in both directions.
    pub stability_index: i64,
    /// Scoring rules.
    pub scoring: ScoringEngine,
    /// Age assigned to every recruit.
    pub recruit_age: u32,
    /// Whether to permute the population at the start of each tick.
    pub shuffle_each_year: bool,
}

impl SimulationState {
    /// Build the initial state: seeded population, starting index, clock
    /// at `NotStarted`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the horizon is zero.
    pub fn new(config: &SimulationConfig) -> Result<Self, ClockError> {
        Ok(Self {
            clock: SimulationClock::new(config.run.total_years)?,
            population: Population::seeded(&config.tiers),
            stability_index: config.scoring.starting_stability_index,
            scoring: ScoringEngine::new(config),
            recruit_age: config.tiers.recruit_age(),
            shuffle_each_year: config.run.shuffle_each_year,
        })
    }
}

/// Execute one complete tick of the simulation.
///
/// The tick is computed on a working copy of the clock and population and
/// committed only when every step succeeds, so a failed tick leaves
/// `state` untouched. Draws taken before the failure are still consumed
/// from `source`.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the run is already finished, or a
/// population/scoring error if an age or the index would overflow.
pub fn run_tick(
    state: &mut SimulationState,
    source: &mut dyn RandomSource,
) -> Result<TickSummary, TickError> {
    let mut clock = state.clock.clone();
    let year = clock.begin_year()?;
    let mut population = state.population.clone();

    // --- Recruit ---
    let influx = source.draw_influx();
    let recruited = usize::try_from(influx).unwrap_or(0);
    if influx < 0 {
        debug!(year, influx, "Negative influx draw, no recruits");
    }
    population.recruit(recruited, state.recruit_age);

    // --- Shuffle ---
    if state.shuffle_each_year {
        source.shuffle(population.as_mut_slice());
    }

    // --- Age ---
    population
        .age_all()
        .map_err(|source| TickError::Population { year, source })?;

    // --- Cull ---
    let deaths = population.cull_deceased(source);

    // --- Vacancy ---
    let scoring_err = |source: ScoringError| TickError::Scoring { year, source };
    let vacancy = state
        .scoring
        .assess_vacancies(&population)
        .map_err(scoring_err)?;
    let mut stability_index =
        scoring::accumulate(state.stability_index, vacancy.delta).map_err(scoring_err)?;

    // --- Reelection ---
    let reelection_delta = state
        .scoring
        .assess_reelection(year, &population)
        .map_err(scoring_err)?;
    if let Some(delta) = reelection_delta {
        stability_index = scoring::accumulate(stability_index, delta).map_err(scoring_err)?;
    }

    // --- Advance ---
    clock.end_year();
    state.clock = clock;
    state.population = population;
    state.stability_index = stability_index;

    if state.population.is_empty() {
        warn!(year, deaths, "Population extinct");
    }
    if let Some(delta) = reelection_delta {
        info!(
            year,
            delta,
            stability_index = state.stability_index,
            "Consul reelection assessed"
        );
    }
    debug!(
        year,
        influx,
        recruited,
        deaths,
        population = state.population.len(),
        vacancy_delta = vacancy.delta,
        stability_index = state.stability_index,
        "Tick complete"
    );

    Ok(TickSummary {
        year,
        influx,
        recruited,
        deaths,
        population: state.population.len(),
        shortfalls: vacancy.shortfalls,
        vacancy_delta: vacancy.delta,
        reelection_delta,
        stability_index: state.stability_index,
    })
}
