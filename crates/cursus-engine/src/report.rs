//! End-of-run report written to stdout.
//!
//! The text form lists the final stability index, the annual fill rate per
//! tier and the age distribution of the survivors. The JSON form carries
//! the same data plus run metadata.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use cursus_core::random::RandomSource;
use cursus_core::runner::{Simulation, SimulationResult};
use cursus_types::{AgeDistribution, FillRate, Tier};
use serde::Serialize;
use uuid::Uuid;

/// Everything printed after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// Seed the random source was built from.
    pub seed: u64,
    /// Configured horizon.
    pub total_years: u32,
    /// Wall-clock start of the run loop.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run loop.
    pub finished_at: DateTime<Utc>,
    /// Stability index after the last tick.
    pub final_stability_index: i64,
    /// Survivors after the last tick.
    pub final_population: usize,
    /// Quota as a percentage of the horizon, per tier.
    pub fill_rates: BTreeMap<Tier, FillRate>,
    /// Survivors grouped by tier.
    pub age_distribution: AgeDistribution,
}

impl RunReport {
    /// Assemble the report from a finished simulation and its result.
    pub fn new<R: RandomSource>(simulation: &Simulation<R>, result: &SimulationResult) -> Self {
        Self {
            run_id: result.run_id,
            seed: simulation.config().run.seed,
            total_years: simulation.config().run.total_years,
            started_at: result.started_at,
            finished_at: result.finished_at,
            final_stability_index: result.final_stability_index,
            final_population: result.final_population,
            fill_rates: simulation.fill_rates(),
            age_distribution: simulation.age_distribution(),
        }
    }

    /// Render as a pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the report cannot be encoded.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "End-of-Simulation Stability Index: {}", self.final_stability_index)?;

        writeln!(f, "Annual Fill Rate:")?;
        for (tier, rate) in &self.fill_rates {
            writeln!(f, "{tier}: {:.2}%", rate.percent)?;
        }

        writeln!(f, "Age Distribution:")?;
        for tier in Tier::ALL {
            let summary = self.age_distribution.get(tier);
            writeln!(
                f,
                "{tier}: Count={}, Average Age={:.2}",
                summary.count, summary.average_age
            )?;
        }
        Ok(())
    }
}
