//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run loop so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: fleet_core::config::ConfigError,
    },

    /// The simulation could not be built from the configuration.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: fleet_core::SimulationError,
    },

    /// The tick loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: fleet_core::runner::RunnerError,
    },

    /// The log filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {message}")]
    LogFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },
}
