//! The officeholder population and its yearly transitions.
//!
//! A [`Population`] is an unordered multiset of [`Individual`]s. Order only
//! matters for which life expectancy draw an individual receives, which is
//! why the tick cycle shuffles before culling.

use cursus_types::{AgeBand, Individual, Tier};

use crate::config::TierConfig;
use crate::random::RandomSource;

/// Errors that can occur during population transitions.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// Aging an individual would overflow the age counter.
    #[error("age overflow: cannot age an individual past {age}")]
    AgeOverflow {
        /// The age that could not be incremented.
        age: u32,
    },
}

/// Office-holding individuals, in no meaningful order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Create an empty population.
    pub const fn new() -> Self {
        Self {
            individuals: Vec::new(),
        }
    }

    /// Create a population with the starting cohort for `tiers`.
    pub fn seeded(tiers: &TierConfig) -> Self {
        let mut population = Self::new();
        population.seed(tiers);
        population
    }

    /// Build a population from explicit ages (useful for testing).
    pub fn from_ages<I>(ages: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            individuals: ages.into_iter().map(Individual::new).collect(),
        }
    }

    /// Add the starting cohort: each tier's quota, at that tier's minimum age.
    ///
    /// With the default tiers this is 20 x 30, 10 x 36, 8 x 39 and 2 x 42.
    pub fn seed(&mut self, tiers: &TierConfig) {
        for tier in Tier::ALL {
            let count = usize::try_from(tiers.quota(tier)).unwrap_or(usize::MAX);
            self.recruit(count, tiers.min_age(tier));
        }
    }

    /// Append `count` individuals of the given age.
    pub fn recruit(&mut self, count: usize, age: u32) {
        self.individuals
            .extend(std::iter::repeat_n(Individual::new(age), count));
    }

    /// Age every individual by one year.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::AgeOverflow`] if an age is already
    /// `u32::MAX`.
    pub fn age_all(&mut self) -> Result<(), PopulationError> {
        for individual in &mut self.individuals {
            *individual = individual
                .aged()
                .ok_or(PopulationError::AgeOverflow {
                    age: individual.age(),
                })?;
        }
        Ok(())
    }

    /// Remove every individual whose age exceeds a fresh life expectancy
    /// draw. Returns the number removed.
    ///
    /// Each individual gets its own draw, taken in collection order. An
    /// individual survives when `age <= draw`.
    pub fn cull_deceased(&mut self, source: &mut dyn RandomSource) -> usize {
        let before = self.individuals.len();
        self.individuals.retain(|individual| {
            let draw = source.draw_life_expectancy();
            let dies = f64::from(individual.age()) > draw;
            !dies
        });
        before.saturating_sub(self.individuals.len())
    }

    /// Number of individuals whose age falls inside `band`.
    pub fn count_in_range(&self, band: AgeBand) -> usize {
        self.individuals
            .iter()
            .filter(|individual| band.contains(individual.age()))
            .count()
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Iterate over the individuals.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Mutable view used for in-place permutation.
    pub fn as_mut_slice(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }
}
