//! Random draws that drive recruitment, mortality and the yearly shuffle.
//!
//! The [`RandomSource`] trait abstracts where draws come from. The engine
//! calls it in a fixed order every tick, so a single continuing stream
//! reproduces a run exactly:
//!
//! 1. one [`draw_influx`](RandomSource::draw_influx)
//! 2. one [`shuffle`](RandomSource::shuffle) (when enabled)
//! 3. one [`draw_life_expectancy`](RandomSource::draw_life_expectancy) per
//!    individual, in collection order
//!
//! [`SeededRandomSource`] is the production stream. [`ScriptedRandomSource`]
//! replays fixed values so tests can pin down exact outcomes.

use std::collections::VecDeque;

use cursus_types::Individual;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use crate::config::DemographyConfig;

/// Errors that can occur while constructing a random source.
#[derive(Debug, thiserror::Error)]
pub enum RandomError {
    /// The mean is not finite, or the standard deviation is negative or
    /// not finite.
    #[error("invalid {name} distribution parameters (mean {mean}, std dev {std_dev})")]
    InvalidParameters {
        /// Which distribution was being built.
        name: &'static str,
        /// The requested mean.
        mean: f64,
        /// The requested standard deviation.
        std_dev: f64,
    },

    /// A normal distribution could not be built from the parameters.
    #[error("invalid {name} distribution (mean {mean}, std dev {std_dev}): {source}")]
    Distribution {
        /// Which distribution was being built.
        name: &'static str,
        /// The requested mean.
        mean: f64,
        /// The requested standard deviation.
        std_dev: f64,
        /// The underlying distribution error.
        source: rand_distr::NormalError,
    },
}

/// A source of the three stochastic operations a tick needs.
pub trait RandomSource {
    /// Number of recruits arriving this year.
    ///
    /// The value is a normal sample truncated toward zero. It may be
    /// negative; callers treat a negative influx as zero recruits.
    fn draw_influx(&mut self) -> i64;

    /// Life expectancy for one individual's mortality check this year.
    ///
    /// May be negative, which kills the individual outright.
    fn draw_life_expectancy(&mut self) -> f64;

    /// Permute `individuals` in place.
    fn shuffle(&mut self, individuals: &mut [Individual]);
}

/// Production random source: one seeded `SmallRng` stream shared by two
/// normal distributions and the shuffle.
#[derive(Debug, Clone)]
pub struct SeededRandomSource {
    rng: SmallRng,
    influx: Normal<f64>,
    life_expectancy: Normal<f64>,
}

impl SeededRandomSource {
    /// Build a source from a seed and the demography distributions.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::InvalidParameters`] if either mean is not
    /// finite or either standard deviation is negative or not finite, and
    /// [`RandomError::Distribution`] if `rand_distr` still rejects them.
    pub fn new(seed: u64, demography: &DemographyConfig) -> Result<Self, RandomError> {
        let influx = normal(
            "annual influx",
            demography.annual_influx_mean,
            demography.annual_influx_std_dev,
        )?;
        let life_expectancy = normal(
            "life expectancy",
            demography.life_expectancy_mean,
            demography.life_expectancy_std_dev,
        )?;
        Ok(Self {
            rng: SmallRng::seed_from_u64(seed),
            influx,
            life_expectancy,
        })
    }
}

fn normal(name: &'static str, mean: f64, std_dev: f64) -> Result<Normal<f64>, RandomError> {
    // `Normal::new` only rejects a non-finite standard deviation.
    if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
        return Err(RandomError::InvalidParameters {
            name,
            mean,
            std_dev,
        });
    }
    Normal::new(mean, std_dev).map_err(|source| RandomError::Distribution {
        name,
        mean,
        std_dev,
        source,
    })
}

impl RandomSource for SeededRandomSource {
    #[allow(clippy::cast_possible_truncation)]
    fn draw_influx(&mut self) -> i64 {
        // Truncation toward zero is intended; `as` also saturates.
        self.influx.sample(&mut self.rng).trunc() as i64
    }

    fn draw_life_expectancy(&mut self) -> f64 {
        self.life_expectancy.sample(&mut self.rng)
    }

    fn shuffle(&mut self, individuals: &mut [Individual]) {
        individuals.shuffle(&mut self.rng);
    }
}

/// A random source that replays scripted values.
///
/// Influx values are consumed one per call; once exhausted, the influx is
/// zero. Life expectancy values are consumed one per call; once exhausted,
/// [`fallback_life_expectancy`](Self::with_fallback_life_expectancy) is
/// returned. Shuffling leaves the order untouched.
#[derive(Debug, Clone)]
pub struct ScriptedRandomSource {
    influx: VecDeque<i64>,
    life_expectancy: VecDeque<f64>,
    fallback_life_expectancy: f64,
    shuffles: u64,
    life_expectancy_draws: u64,
}

impl ScriptedRandomSource {
    /// Create a source with the given scripts and an infinite fallback
    /// life expectancy (nobody dies once the script runs out).
    pub fn new(influx: Vec<i64>, life_expectancy: Vec<f64>) -> Self {
        Self {
            influx: influx.into(),
            life_expectancy: life_expectancy.into(),
            fallback_life_expectancy: f64::INFINITY,
            shuffles: 0,
            life_expectancy_draws: 0,
        }
    }

    /// Use `value` for every life expectancy draw after the script ends.
    #[must_use]
    pub fn with_fallback_life_expectancy(mut self, value: f64) -> Self {
        self.fallback_life_expectancy = value;
        self
    }

    /// How many times [`RandomSource::shuffle`] has been called.
    pub const fn shuffles(&self) -> u64 {
        self.shuffles
    }

    /// How many life expectancy values have been drawn.
    pub const fn life_expectancy_draws(&self) -> u64 {
        self.life_expectancy_draws
    }
}

impl Default for ScriptedRandomSource {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl RandomSource for ScriptedRandomSource {
    fn draw_influx(&mut self) -> i64 {
        self.influx.pop_front().unwrap_or(0)
    }

    fn draw_life_expectancy(&mut self) -> f64 {
        self.life_expectancy_draws = self.life_expectancy_draws.saturating_add(1);
        self.life_expectancy
            .pop_front()
            .unwrap_or(self.fallback_life_expectancy)
    }

    fn shuffle(&mut self, _individuals: &mut [Individual]) {
        self.shuffles = self.shuffles.saturating_add(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SeededRandomSource {
        SeededRandomSource::new(seed, &DemographyConfig::default()).unwrap()
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..100 {
            assert_eq!(a.draw_influx(), b.draw_influx());
            assert_eq!(
                a.draw_life_expectancy().to_bits(),
                b.draw_life_expectancy().to_bits()
            );
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = seeded(1);
        let mut b = seeded(2);
        let left: Vec<u64> = (0..20).map(|_| a.draw_life_expectancy().to_bits()).collect();
        let right: Vec<u64> = (0..20).map(|_| b.draw_life_expectancy().to_bits()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn influx_is_truncated_sample() {
        let demography = DemographyConfig {
            annual_influx_mean: 7.9,
            annual_influx_std_dev: 0.0,
            ..DemographyConfig::default()
        };
        let mut source = SeededRandomSource::new(0, &demography).unwrap();
        assert_eq!(source.draw_influx(), 7);
    }

    #[test]
    fn negative_influx_truncates_toward_zero() {
        let demography = DemographyConfig {
            annual_influx_mean: -3.7,
            annual_influx_std_dev: 0.0,
            ..DemographyConfig::default()
        };
        let mut source = SeededRandomSource::new(0, &demography).unwrap();
        assert_eq!(source.draw_influx(), -3);
    }

    #[test]
    fn influx_centres_on_mean() {
        let mut source = seeded(7);
        let n = 5_000_i64;
        let total: i64 = (0..n).map(|_| source.draw_influx()).sum();
        let mean = total / n;
        // Truncation pulls the mean slightly below 15.
        assert!((13..=16).contains(&mean), "mean influx was {mean}");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut source = seeded(3);
        let mut people: Vec<Individual> = (30..70).map(Individual::new).collect();
        let before = people.clone();
        source.shuffle(&mut people);
        let mut sorted = people.clone();
        sorted.sort();
        assert_eq!(sorted, before);
    }

    #[test]
    fn rejects_negative_std_dev() {
        let demography = DemographyConfig {
            life_expectancy_std_dev: -1.0,
            ..DemographyConfig::default()
        };
        let result = SeededRandomSource::new(0, &demography);
        assert!(matches!(
            result,
            Err(RandomError::InvalidParameters {
                name: "life expectancy",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_mean() {
        for mean in [f64::NAN, f64::INFINITY] {
            let demography = DemographyConfig {
                life_expectancy_mean: mean,
                ..DemographyConfig::default()
            };
            let result = SeededRandomSource::new(0, &demography);
            assert!(matches!(result, Err(RandomError::InvalidParameters { .. })));
        }
    }

    #[test]
    fn rejects_non_finite_std_dev() {
        let demography = DemographyConfig {
            annual_influx_std_dev: f64::NAN,
            ..DemographyConfig::default()
        };
        let result = SeededRandomSource::new(0, &demography);
        assert!(matches!(
            result,
            Err(RandomError::InvalidParameters {
                name: "annual influx",
                ..
            })
        ));
    }

    #[test]
    fn scripted_source_replays_then_falls_back() {
        let mut source = ScriptedRandomSource::new(vec![3, -2], vec![40.0])
            .with_fallback_life_expectancy(10.0);
        assert_eq!(source.draw_influx(), 3);
        assert_eq!(source.draw_influx(), -2);
        assert_eq!(source.draw_influx(), 0);
        assert_eq!(source.draw_life_expectancy(), 40.0);
        assert_eq!(source.draw_life_expectancy(), 10.0);
        assert_eq!(source.life_expectancy_draws(), 2);
    }

    #[test]
    fn scripted_shuffle_keeps_order() {
        let mut source = ScriptedRandomSource::default();
        let mut people = vec![Individual::new(31), Individual::new(30)];
        source.shuffle(&mut people);
        assert_eq!(people, vec![Individual::new(31), Individual::new(30)]);
        assert_eq!(source.shuffles(), 1);
    }
}
