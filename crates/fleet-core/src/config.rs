//! Configuration loading and typed config structures for the fleet simulation.
//!
//! The canonical configuration lives in `fleet-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields the reference 18x14 warehouse with five robots.
//!
//! [`SimulationConfig::validate`] rejects settings the simulation cannot be
//! built from; it runs before any state is created.

use std::collections::BTreeSet;
use std::path::Path;

use fleet_control::{CongestionConfig, MotionConfig};
use fleet_grid::{LayoutKind, default_start_cells};
use fleet_types::GridCell;
use serde::Deserialize;

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

    /// The configuration parsed but describes an impossible simulation.
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

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `fleet-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run identity and timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Floor dimensions and layout.
    #[serde(default)]
    pub grid: GridConfig,

    /// Robot placement and initial state.
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Motion and collision thresholds.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Congestion learner parameters.
    #[serde(default)]
    pub congestion: CongestionConfig,

    /// Task lifecycle and generation.
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check every construction-time condition.
    ///
    /// Obstacle placement of start cells depends on the layout and is
    /// checked when the fleet is placed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.grid.width, self.grid.height);
        if width == 0 || height == 0 {
            return Err(invalid(format!("grid dimensions {width}x{height} must be non-zero")));
        }
        if self.congestion.zone_size == 0 {
            return Err(invalid("congestion.zone_size must be at least 1"));
        }
        if self.congestion.history_capacity == 0 {
            return Err(invalid("congestion.history_capacity must be at least 1"));
        }
        if !self.motion.thresholds_are_ordered() {
            return Err(invalid(
                "motion thresholds must satisfy 0 < collision < critical < warning",
            ));
        }
        if self.motion.max_blocked_ticks == 0 {
            return Err(invalid("motion.max_blocked_ticks must be at least 1"));
        }
        if !is_non_negative(self.world.delta_time_seconds) {
            return Err(invalid("world.delta_time_seconds must be finite and non-negative"));
        }
        if !is_non_negative(self.world.speed_multiplier) {
            return Err(invalid("world.speed_multiplier must be finite and non-negative"));
        }
        if !(0.0..=100.0).contains(&self.fleet.initial_battery) {
            return Err(invalid("fleet.initial_battery must be within [0, 100]"));
        }
        if !self.fleet.initial_speed.is_finite() || self.fleet.initial_speed <= 0.0 {
            return Err(invalid("fleet.initial_speed must be positive"));
        }
        if !(0.0..=1.0).contains(&self.tasks.spawn_probability) {
            return Err(invalid("tasks.spawn_probability must be within [0, 1]"));
        }

        let mut seen = BTreeSet::new();
        for cell in &self.fleet.start_positions {
            if cell.x >= width || cell.y >= height {
                return Err(invalid(format!("start position {cell} is outside the grid")));
            }
            if !seen.insert(*cell) {
                return Err(invalid(format!("start position {cell} is used twice")));
            }
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Run identity and timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Name of the run, used in logs.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for generated workloads.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Wall-clock milliseconds between ticks in the run loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_delta_time_seconds")]
    pub delta_time_seconds: f64,

    /// Global speed multiplier.
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            delta_time_seconds: default_delta_time_seconds(),
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

/// Floor dimensions and layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Columns.
    #[serde(default = "default_grid_width")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_grid_height")]
    pub height: u32,

    /// Floor plan.
    #[serde(default)]
    pub layout: LayoutKind,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
            layout: LayoutKind::default(),
        }
    }
}

/// Robot placement and initial state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FleetConfig {
    /// One robot is created per cell, in order.
    #[serde(default = "default_start_cells")]
    pub start_positions: Vec<GridCell>,

    /// Starting battery percentage.
    #[serde(default = "default_initial_battery")]
    pub initial_battery: f64,

    /// Starting speed multiplier.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            start_positions: default_start_cells(),
            initial_battery: default_initial_battery(),
            initial_speed: default_initial_speed(),
        }
    }
}

/// Task lifecycle and generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TasksConfig {
    /// Simulated milliseconds a completed task stays visible.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,

    /// Per-tick probability that the generator submits a task.
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            retention_ms: default_retention_ms(),
            spawn_probability: default_spawn_probability(),
        }
    }
}

/// Run boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks; 0 runs until interrupted.
    #[serde(default)]
    pub max_ticks: u64,

    /// Tick from which the efficiency baseline may be latched.
    #[serde(default = "default_baseline_tick")]
    pub baseline_tick: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            baseline_tick: default_baseline_tick(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "warehouse-floor".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_delta_time_seconds() -> f64 {
    0.05
}

const fn default_speed_multiplier() -> f64 {
    1.0
}

const fn default_grid_width() -> u32 {
    18
}

const fn default_grid_height() -> u32 {
    14
}

const fn default_initial_battery() -> f64 {
    100.0
}

const fn default_initial_speed() -> f64 {
    1.0
}

const fn default_retention_ms() -> u64 {
    3_000
}

const fn default_spawn_probability() -> f64 {
    0.02
}

const fn default_baseline_tick() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_owned()
}
