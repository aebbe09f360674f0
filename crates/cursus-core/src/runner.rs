//! Simulation runner: owns one run from seeding to the final tick.
//!
//! [`Simulation`] bundles the configuration, the mutable
//! [`SimulationState`] and the [`RandomSource`], and exposes the three
//! operations the reporting layer needs:
//!
//! - [`Simulation::run`] -- execute every remaining tick
//! - [`Simulation::final_stability_index`]
//! - [`Simulation::age_distribution`]
//!
//! The loop is fixed-length and sequential: exactly `total_years` ticks,
//! no pause, no cancellation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use cursus_types::{AgeDistribution, FillRate, Tier};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::ClockError;
use crate::config::{ConfigError, SimulationConfig};
use crate::random::{RandomError, RandomSource, SeededRandomSource};
use crate::report;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The random source could not be built.
    #[error("random source error: {source}")]
    Random {
        /// The underlying random source error.
        #[from]
        source: RandomError,
    },

    /// The clock could not be built.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Identifier for this run, shared by every log line it emits.
    pub run_id: Uuid,
    /// Wall-clock time the run loop started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the run loop ended.
    pub finished_at: DateTime<Utc>,
    /// Ticks executed by this call to [`Simulation::run`].
    pub years_executed: u32,
    /// Stability index after the last tick.
    pub final_stability_index: i64,
    /// Population size after the last tick.
    pub final_population: usize,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
}

/// One simulation run.
#[derive(Debug, Clone)]
pub struct Simulation<R = SeededRandomSource> {
    run_id: Uuid,
    config: SimulationConfig,
    state: SimulationState,
    source: R,
}

impl Simulation<SeededRandomSource> {
    /// Build a run driven by a [`SeededRandomSource`] seeded from
    /// `config.run.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Random`] if the distributions cannot be built,
    /// or [`RunnerError::Config`] if the configuration is otherwise invalid.
    pub fn new(config: SimulationConfig) -> Result<Self, RunnerError> {
        let source = SeededRandomSource::new(config.run.seed, &config.demography)?;
        Self::with_source(config, source)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Build a run driven by an arbitrary random source.
    ///
    /// The population is seeded here; seeding is not a tick.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if the configuration is invalid.
    pub fn with_source(config: SimulationConfig, source: R) -> Result<Self, RunnerError> {
        config.validate()?;
        let state = SimulationState::new(&config)?;
        Ok(Self {
            run_id: Uuid::now_v7(),
            config,
            state,
            source,
        })
    }

    /// Execute a single tick.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Tick`] if the run is finished or the tick
    /// fails.
    pub fn step(&mut self) -> Result<TickSummary, RunnerError> {
        Ok(tick::run_tick(&mut self.state, &mut self.source)?)
    }

    /// Execute every remaining tick, calling `callback` after each one.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Tick`] if the run has already finished or a
    /// tick fails.
    pub fn run(&mut self, callback: &mut dyn TickCallback) -> Result<SimulationResult, RunnerError> {
        if self.state.clock.is_finished() {
            return Err(RunnerError::Tick {
                source: TickError::Clock {
                    source: ClockError::Finished {
                        total_years: self.state.clock.total_years(),
                    },
                },
            });
        }

        let started_at = Utc::now();
        let mut years_executed: u32 = 0;
        let mut last_summary: Option<TickSummary> = None;

        info!(
            run_id = %self.run_id,
            seed = self.config.run.seed,
            total_years = self.state.clock.total_years(),
            population = self.state.population.len(),
            stability_index = self.state.stability_index,
            "Simulation starting"
        );

        while !self.state.clock.is_finished() {
            let summary = self.step()?;
            years_executed = years_executed.saturating_add(1);
            callback.on_tick(&summary, &self.state);
            last_summary = Some(summary);
        }

        let result = SimulationResult {
            run_id: self.run_id,
            started_at,
            finished_at: Utc::now(),
            years_executed,
            final_stability_index: self.state.stability_index,
            final_population: self.state.population.len(),
            final_summary: last_summary,
        };
        log_simulation_end(&result);
        Ok(result)
    }

    /// Current stability index (final once the run has finished).
    pub const fn final_stability_index(&self) -> i64 {
        self.state.stability_index
    }

    /// Survivors grouped by tier, Consul open-ended.
    pub fn age_distribution(&self) -> AgeDistribution {
        report::age_distribution(&self.state.population, &self.config.tiers)
    }

    /// Each tier's quota as a percentage of the horizon.
    pub fn fill_rates(&self) -> BTreeMap<Tier, FillRate> {
        report::fill_rates(&self.config.tiers, self.config.run.total_years)
    }

    /// Whether every tick has been executed.
    pub const fn is_finished(&self) -> bool {
        self.state.clock.is_finished()
    }

    /// Identifier for this run.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The configuration the run was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only view of the simulation state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Read-only view of the random source.
    pub const fn source(&self) -> &R {
        &self.source
    }
}

/// Log the outcome of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    let elapsed_ms = result
        .finished_at
        .signed_duration_since(result.started_at)
        .num_milliseconds();
    info!(
        run_id = %result.run_id,
        years = result.years_executed,
        final_stability_index = result.final_stability_index,
        final_population = result.final_population,
        elapsed_ms,
        "Simulation ended"
    );

    if result.final_population == 0 {
        warn!(run_id = %result.run_id, "Simulation ended with no surviving officeholders");
    }
}
