//! Headless engine binary for the warehouse fleet simulation.
//!
//! Wires the configuration, the simulation facade, a seeded random task
//! generator, and a logging callback into the timed tick loop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `fleet-config.yaml` (or `$FLEET_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation (grid, fleet, congestion zones)
//! 4. Create the task generator from the world seed
//! 5. Run the tick loop until the tick limit or Ctrl-C
//! 6. Log the result

mod error;
mod log_callback;
mod task_generator;

use std::path::PathBuf;

use fleet_core::runner;
use fleet_core::{Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::{DEFAULT_REPORT_EVERY, LogCallback};
use crate::task_generator::RandomTaskSource;

const DEFAULT_CONFIG_PATH: &str = "fleet-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, simulation
/// construction, or a tick fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging depends on it, so report afterwards.
    let (config, source_path) = load_config()?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| EngineError::LogFilter {
            directive: config.logging.level.clone(),
            message: e.to_string(),
        })?;
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("fleet-engine starting");
    match &source_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        world_name = %config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        spawn_probability = config.tasks.spawn_probability,
        "Configuration resolved"
    );

    // 3. Build the simulation.
    let seed = config.world.seed;
    let spawn_probability = config.tasks.spawn_probability;
    let mut simulation = Simulation::new(config)?;

    // 4. Task generator and callback.
    let mut source = RandomTaskSource::new(seed, spawn_probability);
    let mut callback = LogCallback::new(DEFAULT_REPORT_EVERY);

    // 5. Run until the tick limit, or until interrupted.
    let result = tokio::select! {
        result = runner::run_simulation(&mut simulation, &mut source, &mut callback) => Some(result?),
        _ = tokio::signal::ctrl_c() => None,
    };

    // 6. Log results.
    match result {
        Some(result) => runner::log_simulation_end(&result, &simulation),
        None => info!(
            tick = simulation.tick_count(),
            tasks_completed = simulation.stats().tasks_completed,
            "Interrupted"
        ),
    }
    info!(total_ticks = simulation.tick_count(), "fleet-engine shutdown complete");

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads `$FLEET_CONFIG` when set, otherwise `fleet-config.yaml` relative to
/// the working directory. A missing default file yields the defaults; a
/// missing file named explicitly is an error.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os("FLEET_CONFIG").map(PathBuf::from) {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }
    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}
