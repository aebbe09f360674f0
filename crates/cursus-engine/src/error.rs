//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and report output.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: cursus_core::config::ConfigError,
    },

    /// Building or running the simulation failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: cursus_core::runner::RunnerError,
    },

    /// The log filter could not be built from `logging.level`.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },

    /// The JSON report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
