//! Tick callback that logs per-year progress.

use cursus_core::runner::TickCallback;
use cursus_core::tick::{SimulationState, TickSummary};
use tracing::{debug, info};

/// Logs each tick at debug level and a progress line every `interval`
/// years at info level.
#[derive(Debug, Clone, Copy)]
pub struct LoggingCallback {
    interval: u32,
    lowest_index: Option<i64>,
}

impl LoggingCallback {
    /// Create a callback that reports progress every `interval` years.
    /// An interval of zero disables the periodic line.
    pub const fn new(interval: u32) -> Self {
        Self {
            interval,
            lowest_index: None,
        }
    }

    /// Lowest stability index seen across all ticks so far.
    pub const fn lowest_index(&self) -> Option<i64> {
        self.lowest_index
    }

    fn is_progress_year(&self, completed: u32) -> bool {
        completed.checked_rem(self.interval).is_some_and(|rem| rem == 0)
    }
}

impl TickCallback for LoggingCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.lowest_index = Some(
            self.lowest_index
                .map_or(summary.stability_index, |low| low.min(summary.stability_index)),
        );

        debug!(
            year = summary.year,
            recruited = summary.recruited,
            deaths = summary.deaths,
            population = summary.population,
            vacancy_delta = summary.vacancy_delta,
            reelection_delta = ?summary.reelection_delta,
            stability_index = summary.stability_index,
            "Year complete"
        );

        let completed = state.clock.completed_years();
        if self.is_progress_year(completed) {
            info!(
                completed_years = completed,
                total_years = state.clock.total_years(),
                population = summary.population,
                stability_index = summary.stability_index,
                "Simulation progress"
            );
        }
    }
}
