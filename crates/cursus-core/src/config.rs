//! Configuration loading and typed config structures for the Cursus simulation.
//!
//! Every threshold the engine reads (tier ages, quotas, penalties,
//! distribution parameters, horizon) lives in [`SimulationConfig`] and is
//! passed into the engine at construction. All fields default to the
//! reference values, so an empty YAML document yields the canonical run.
//!
//! The optional on-disk form is `cursus-config.yaml`; see
//! [`SimulationConfig::from_file`].

use std::path::Path;

use cursus_types::{AgeBand, Tier};
use serde::Deserialize;

/// Environment variable overriding `run.seed`.
pub const SEED_ENV: &str = "CURSUS_SEED";

/// Environment variable overriding `run.total_years`.
pub const TOTAL_YEARS_ENV: &str = "CURSUS_TOTAL_YEARS";

/// Log levels accepted by `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible run.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, horizon and per-year mechanics toggles.
    #[serde(default)]
    pub run: RunConfig,

    /// Tier age thresholds and annual quotas.
    #[serde(default)]
    pub tiers: TierConfig,

    /// Stability index rules.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Recruitment and mortality distributions.
    #[serde(default)]
    pub demography: DemographyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values after parsing:
    /// - `CURSUS_SEED` overrides `run.seed`
    /// - `CURSUS_TOTAL_YEARS` overrides `run.total_years`
    ///
    /// The result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override or a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file_with_overrides(path, |key| std::env::var(key).ok())
    }

    /// Load configuration from a YAML file, taking overrides from `lookup`
    /// instead of the process environment.
    ///
    /// Overrides are applied before validation, so an override can repair
    /// an out-of-range file value.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn from_file_with_overrides<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_overrides_from(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file) this does not consult the
    /// environment, which keeps it deterministic for tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override run parameters from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but not a
    /// valid unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Override run parameters from an arbitrary key lookup.
    ///
    /// `lookup` receives [`SEED_ENV`] and [`TOTAL_YEARS_ENV`] and returns
    /// the raw value when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SEED_ENV) {
            self.run.seed = raw.trim().parse().map_err(|err| ConfigError::Invalid {
                reason: format!("{SEED_ENV}={raw:?} is not a u64: {err}"),
            })?;
        }
        if let Some(raw) = lookup(TOTAL_YEARS_ENV) {
            self.run.total_years = raw.trim().parse().map_err(|err| ConfigError::Invalid {
                reason: format!("{TOTAL_YEARS_ENV}={raw:?} is not a u32: {err}"),
            })?;
        }
        Ok(())
    }

    /// Check cross-field invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.total_years == 0 {
            return Err(invalid("run.total_years must be at least 1"));
        }
        self.tiers.validate()?;
        self.demography.validate()?;
        if self.scoring.years_between_consul_reelection == 0 {
            return Err(invalid(
                "scoring.years_between_consul_reelection must be at least 1",
            ));
        }
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid {
                reason: format!("unknown logging.level: {}", self.logging.level),
            });
        }
        Ok(())
    }

    /// Consul band used by the vacancy rule under this configuration.
    pub fn vacancy_consul_band(&self) -> AgeBand {
        self.consul_band(self.scoring.vacancy_consul_band)
    }

    /// Consul band used by the reelection rule under this configuration.
    pub fn reelection_consul_band(&self) -> AgeBand {
        self.consul_band(self.scoring.reelection_consul_band)
    }

    fn consul_band(&self, kind: ConsulBand) -> AgeBand {
        match kind {
            ConsulBand::OpenEnded => AgeBand::open_ended(self.tiers.consul_min_age),
            ConsulBand::Capped => AgeBand::bounded(
                self.tiers.consul_min_age,
                self.demography.life_expectancy_cap(),
            ),
        }
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Seed, horizon and per-year mechanics toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of simulated years (ticks).
    #[serde(default = "default_total_years")]
    pub total_years: u32,

    /// Whether the population is permuted at the start of every tick.
    ///
    /// The permutation never changes a count, but it consumes entropy, so
    /// turning it off changes every later draw for a given seed.
    #[serde(default = "default_true")]
    pub shuffle_each_year: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            total_years: default_total_years(),
            shuffle_each_year: true,
        }
    }
}

/// Tier age thresholds and annual quotas.
///
/// Each tier's band starts at its minimum age and ends where the next tier
/// begins. The Consul band is open-ended for classification; scoring rules
/// may cap it (see [`ConsulBand`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierConfig {
    /// Minimum age for Quaestor, also the age of every recruit.
    #[serde(default = "default_quaestor_min_age")]
    pub quaestor_min_age: u32,

    /// Minimum age for Aedile.
    #[serde(default = "default_aedile_min_age")]
    pub aedile_min_age: u32,

    /// Minimum age for Praetor.
    #[serde(default = "default_praetor_min_age")]
    pub praetor_min_age: u32,

    /// Minimum age for Consul.
    #[serde(default = "default_consul_min_age")]
    pub consul_min_age: u32,

    /// Quaestor positions per year.
    #[serde(default = "default_quaestor_quota")]
    pub quaestor_quota: u32,

    /// Aedile positions per year.
    #[serde(default = "default_aedile_quota")]
    pub aedile_quota: u32,

    /// Praetor positions per year.
    #[serde(default = "default_praetor_quota")]
    pub praetor_quota: u32,

    /// Consul positions per year.
    #[serde(default = "default_consul_quota")]
    pub consul_quota: u32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            quaestor_min_age: default_quaestor_min_age(),
            aedile_min_age: default_aedile_min_age(),
            praetor_min_age: default_praetor_min_age(),
            consul_min_age: default_consul_min_age(),
            quaestor_quota: default_quaestor_quota(),
            aedile_quota: default_aedile_quota(),
            praetor_quota: default_praetor_quota(),
            consul_quota: default_consul_quota(),
        }
    }
}

impl TierConfig {
    /// Minimum age for a tier.
    pub const fn min_age(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Quaestor => self.quaestor_min_age,
            Tier::Aedile => self.aedile_min_age,
            Tier::Praetor => self.praetor_min_age,
            Tier::Consul => self.consul_min_age,
        }
    }

    /// Annual quota for a tier.
    pub const fn quota(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Quaestor => self.quaestor_quota,
            Tier::Aedile => self.aedile_quota,
            Tier::Praetor => self.praetor_quota,
            Tier::Consul => self.consul_quota,
        }
    }

    /// Classification band for a tier. Consul is open-ended.
    pub const fn band(&self, tier: Tier) -> AgeBand {
        match tier.next() {
            Some(next) => AgeBand::bounded(self.min_age(tier), self.min_age(next)),
            None => AgeBand::open_ended(self.min_age(tier)),
        }
    }

    /// The tier whose classification band contains `age`, if any.
    pub fn classify(&self, age: u32) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|&tier| self.band(tier).contains(age))
    }

    /// Age at which recruits enter the population.
    pub const fn recruit_age(&self) -> u32 {
        self.quaestor_min_age
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for tier in Tier::ALL {
            if self.band(tier).is_empty() {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "tier minimum ages must be strictly ascending ({tier} band {} is empty)",
                        self.band(tier)
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Which age band counts as "Consul" for a scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsulBand {
    /// `[consul_min_age, ceil(life_expectancy_mean))`.
    Capped,
    /// `[consul_min_age, inf)`.
    OpenEnded,
}

/// Stability index rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Index value before the first tick.
    #[serde(default = "default_starting_stability_index")]
    pub starting_stability_index: i64,

    /// Multiplier applied to each tier's shortfall every year.
    #[serde(default = "default_unfilled_position_penalty")]
    pub unfilled_position_penalty: i64,

    /// Multiplier applied to the Consul shortfall on reelection years.
    #[serde(default = "default_consecutive_consul_reelection_penalty")]
    pub consecutive_consul_reelection_penalty: i64,

    /// The reelection rule fires when `year % period == 0`.
    #[serde(default = "default_years_between_consul_reelection")]
    pub years_between_consul_reelection: u32,

    /// Consul band for the yearly vacancy rule.
    #[serde(default = "default_vacancy_consul_band")]
    pub vacancy_consul_band: ConsulBand,

    /// Consul band for the reelection rule.
    #[serde(default = "default_reelection_consul_band")]
    pub reelection_consul_band: ConsulBand,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            starting_stability_index: default_starting_stability_index(),
            unfilled_position_penalty: default_unfilled_position_penalty(),
            consecutive_consul_reelection_penalty: default_consecutive_consul_reelection_penalty(),
            years_between_consul_reelection: default_years_between_consul_reelection(),
            vacancy_consul_band: default_vacancy_consul_band(),
            reelection_consul_band: default_reelection_consul_band(),
        }
    }
}

/// Recruitment and mortality distributions (both normal).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemographyConfig {
    /// Mean recruits per year.
    #[serde(default = "default_annual_influx_mean")]
    pub annual_influx_mean: f64,

    /// Standard deviation of recruits per year.
    #[serde(default = "default_annual_influx_std_dev")]
    pub annual_influx_std_dev: f64,

    /// Mean life expectancy in years.
    #[serde(default = "default_life_expectancy_mean")]
    pub life_expectancy_mean: f64,

    /// Standard deviation of life expectancy in years.
    #[serde(default = "default_life_expectancy_std_dev")]
    pub life_expectancy_std_dev: f64,
}

impl Default for DemographyConfig {
    fn default() -> Self {
        Self {
            annual_influx_mean: default_annual_influx_mean(),
            annual_influx_std_dev: default_annual_influx_std_dev(),
            life_expectancy_mean: default_life_expectancy_mean(),
            life_expectancy_std_dev: default_life_expectancy_std_dev(),
        }
    }
}

impl DemographyConfig {
    /// Exclusive integer age cap equivalent to `age < life_expectancy_mean`.
    ///
    /// For whole ages, `age < mean` holds exactly when `age < ceil(mean)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn life_expectancy_cap(&self) -> u32 {
        // validate() guarantees a finite, positive mean; `as` saturates.
        self.life_expectancy_mean.ceil() as u32
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let params = [
            ("demography.annual_influx_mean", self.annual_influx_mean),
            ("demography.annual_influx_std_dev", self.annual_influx_std_dev),
            ("demography.life_expectancy_mean", self.life_expectancy_mean),
            (
                "demography.life_expectancy_std_dev",
                self.life_expectancy_std_dev,
            ),
        ];
        for (name, value) in params {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be finite (got {value})"),
                });
            }
        }
        if self.annual_influx_std_dev < 0.0 || self.life_expectancy_std_dev < 0.0 {
            return Err(invalid("demography standard deviations must be non-negative"));
        }
        if self.life_expectancy_mean <= 0.0 {
            return Err(invalid("demography.life_expectancy_mean must be positive"));
        }
        Ok(())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Plain,
        }
    }
}

/// Report format written to stdout after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain text tables.
    #[default]
    Text,
    /// A single pretty-printed JSON document.
    Json,
}

/// Report output configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_total_years() -> u32 {
    200
}

const fn default_quaestor_min_age() -> u32 {
    30
}

const fn default_aedile_min_age() -> u32 {
    36
}

const fn default_praetor_min_age() -> u32 {
    39
}

const fn default_consul_min_age() -> u32 {
    42
}

const fn default_quaestor_quota() -> u32 {
    20
}

const fn default_aedile_quota() -> u32 {
    10
}

const fn default_praetor_quota() -> u32 {
    8
}

const fn default_consul_quota() -> u32 {
    2
}

const fn default_starting_stability_index() -> i64 {
    100
}

const fn default_unfilled_position_penalty() -> i64 {
    -5
}

const fn default_consecutive_consul_reelection_penalty() -> i64 {
    -10
}

const fn default_years_between_consul_reelection() -> u32 {
    10
}

const fn default_vacancy_consul_band() -> ConsulBand {
    ConsulBand::Capped
}

const fn default_reelection_consul_band() -> ConsulBand {
    ConsulBand::OpenEnded
}

const fn default_annual_influx_mean() -> f64 {
    15.0
}

const fn default_annual_influx_std_dev() -> f64 {
    5.0
}

const fn default_life_expectancy_mean() -> f64 {
    55.0
}

const fn default_life_expectancy_std_dev() -> f64 {
    10.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
