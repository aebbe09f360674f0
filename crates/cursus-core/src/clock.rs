//! Simulation clock: the year counter and run lifecycle.
//!
//! The clock moves through three phases:
//!
//! ```text
//! NotStarted --start--> Running(0) --advance--> Running(1) ... --advance--> Finished
//! ```
//!
//! The year is the single source of truth for which rules apply in a tick.
//! Once `Finished`, every further transition is an error.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// The run is already over; no further ticks are allowed.
    #[error("simulation finished after {total_years} years")]
    Finished {
        /// Configured horizon.
        total_years: u32,
    },

    /// Invalid horizon (zero years).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    /// Seeded, no tick executed yet.
    NotStarted,
    /// Executing the tick for this year.
    Running {
        /// Zero-based year being simulated.
        year: u32,
    },
    /// All years executed.
    Finished,
}

/// Year counter bounded by a fixed horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    phase: ClockPhase,
    total_years: u32,
    completed_years: u32,
}

impl SimulationClock {
    /// Create a clock for a run of `total_years` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `total_years` is 0.
    pub fn new(total_years: u32) -> Result<Self, ClockError> {
        if total_years == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "total_years must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            phase: ClockPhase::NotStarted,
            total_years,
            completed_years: 0,
        })
    }

    /// Enter the next year and return it.
    ///
    /// From `NotStarted` this is year 0. From `Running(y)` it completes year
    /// `y` and enters `y + 1`, unless the horizon is reached, in which case
    /// the clock finishes and [`ClockError::Finished`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Finished`] once every year has been entered.
    pub fn begin_year(&mut self) -> Result<u32, ClockError> {
        let next = match self.phase {
            ClockPhase::NotStarted => 0,
            ClockPhase::Running { year } => {
                self.completed_years = year.saturating_add(1);
                self.completed_years
            }
            ClockPhase::Finished => {
                return Err(ClockError::Finished {
                    total_years: self.total_years,
                });
            }
        };
        if next >= self.total_years {
            self.phase = ClockPhase::Finished;
            return Err(ClockError::Finished {
                total_years: self.total_years,
            });
        }
        self.phase = ClockPhase::Running { year: next };
        Ok(next)
    }

    /// Mark the current year complete. Moves to `Finished` after the last
    /// year; otherwise the clock stays on the completed year until the next
    /// [`begin_year`](Self::begin_year).
    pub fn end_year(&mut self) {
        if let ClockPhase::Running { year } = self.phase {
            self.completed_years = year.saturating_add(1);
            if self.completed_years >= self.total_years {
                self.phase = ClockPhase::Finished;
            }
        }
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Year currently being simulated, if running.
    pub const fn current_year(&self) -> Option<u32> {
        match self.phase {
            ClockPhase::Running { year } => Some(year),
            ClockPhase::NotStarted | ClockPhase::Finished => None,
        }
    }

    /// Number of ticks fully executed so far.
    pub const fn completed_years(&self) -> u32 {
        self.completed_years
    }

    /// Configured horizon.
    pub const fn total_years(&self) -> u32 {
        self.total_years
    }

    /// Whether every year has been executed.
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, ClockPhase::Finished)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_not_started() {
        let clock = SimulationClock::new(3).unwrap();
        assert_eq!(clock.phase(), ClockPhase::NotStarted);
        assert_eq!(clock.current_year(), None);
        assert_eq!(clock.completed_years(), 0);
    }

    #[test]
    fn years_advance_by_one() {
        let mut clock = SimulationClock::new(3).unwrap();
        assert_eq!(clock.begin_year().unwrap(), 0);
        clock.end_year();
        assert_eq!(clock.begin_year().unwrap(), 1);
        clock.end_year();
        assert_eq!(clock.begin_year().unwrap(), 2);
        assert_eq!(clock.current_year(), Some(2));
        clock.end_year();
        assert!(clock.is_finished());
        assert_eq!(clock.completed_years(), 3);
    }

    #[test]
    fn finished_clock_rejects_further_years() {
        let mut clock = SimulationClock::new(1).unwrap();
        assert_eq!(clock.begin_year().unwrap(), 0);
        clock.end_year();
        assert_eq!(
            clock.begin_year(),
            Err(ClockError::Finished { total_years: 1 })
        );
    }

    #[test]
    fn begin_without_end_still_advances() {
        let mut clock = SimulationClock::new(2).unwrap();
        assert_eq!(clock.begin_year().unwrap(), 0);
        assert_eq!(clock.begin_year().unwrap(), 1);
        assert_eq!(clock.completed_years(), 1);
        assert!(clock.begin_year().is_err());
        assert!(clock.is_finished());
    }

    #[test]
    fn zero_years_is_invalid() {
        assert!(matches!(
            SimulationClock::new(0),
            Err(ClockError::InvalidConfig { .. })
        ));
    }
}
