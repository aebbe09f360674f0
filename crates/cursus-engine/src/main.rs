//! Engine binary for the Cursus simulation.
//!
//! Loads configuration, runs every year of the simulation, and prints the
//! end-of-run report to stdout.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `CURSUS_CONFIG` or `cursus-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation and seed the population
//! 4. Run the tick loop
//! 5. Log the result and print the report

mod error;
mod log_callback;
mod report;

use std::path::PathBuf;

use cursus_core::config::{LogFormat, LoggingConfig, OutputFormat, SimulationConfig};
use cursus_core::runner::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LoggingCallback;
use crate::report::RunReport;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "CURSUS_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "cursus-config.yaml";

/// Years between progress lines.
const PROGRESS_INTERVAL: u32 = 50;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, the run itself, or
/// report serialization fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;

    info!("cursus-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = config.run.seed,
        total_years = config.run.total_years,
        shuffle_each_year = config.run.shuffle_each_year,
        reelection_period = config.scoring.years_between_consul_reelection,
        "Run parameters"
    );

    // 3. Build the simulation.
    let output_format = config.output.format;
    let mut simulation = Simulation::new(config)?;
    info!(
        run_id = %simulation.run_id(),
        population = simulation.state().population.len(),
        "Population seeded"
    );

    // 4. Run.
    let mut callback = LoggingCallback::new(PROGRESS_INTERVAL);
    let result = simulation.run(&mut callback)?;

    // 5. Report.
    info!(
        run_id = %result.run_id,
        lowest_stability_index = ?callback.lowest_index(),
        "cursus-engine shutdown complete"
    );

    let report = RunReport::new(&simulation, &result);
    match output_format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }

    Ok(())
}

/// Load the simulation configuration.
///
/// Uses the file named by `CURSUS_CONFIG` if set, otherwise
/// `cursus-config.yaml` in the working directory. Without a file the
/// defaults are used, still subject to environment overrides.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    // An explicitly named file must exist; the default one is optional.
    if explicit.is_some() || path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let mut config = SimulationConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok((config, None))
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter: {e}"),
        })?;

    match logging.format {
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}
