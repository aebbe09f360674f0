//! Half-open age bands.
//!
//! A band includes its lower bound and excludes its upper bound. A band with
//! no upper bound is open-ended and contains every age at or above `min`.

use serde::{Deserialize, Serialize};

/// An age range `[min, max)`, or `[min, inf)` when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeBand {
    /// Inclusive lower bound.
    pub min: u32,
    /// Exclusive upper bound, `None` for an open-ended band.
    pub max: Option<u32>,
}

impl AgeBand {
    /// A bounded band `[min, max)`.
    pub const fn bounded(min: u32, max: u32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// An open-ended band `[min, inf)`.
    pub const fn open_ended(min: u32) -> Self {
        Self { min, max: None }
    }

    /// Whether `age` falls inside this band.
    pub const fn contains(self, age: u32) -> bool {
        if age < self.min {
            return false;
        }
        match self.max {
            Some(max) => age < max,
            None => true,
        }
    }

    /// Whether the band can contain any age at all.
    pub const fn is_empty(self) -> bool {
        match self.max {
            Some(max) => max <= self.min,
            None => false,
        }
    }
}

impl core::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {max})", self.min),
            None => write!(f, "[{}, inf)", self.min),
        }
    }
}
