//! Host-facing simulation facade.
//!
//! [`Simulation`] owns the configuration and the live [`SimulationState`]
//! and exposes the operations a host drives: `tick`, `submit_task`, state
//! snapshots, `reset`, and robot recall/fault commands. Every call is a
//! discrete transition; a reset is never interleaved with a tick because
//! both take `&mut self`.

use fleet_control::{CongestionLearner, ControlError, Fleet};
use fleet_grid::{GridError, WarehouseGrid, build_grid};
use fleet_types::{
    CongestionZone, LearningMetrics, Robot, RobotId, RobotStatus, Task, TaskId, TaskRequest,
    TickMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::SimClock;
use crate::config::{ConfigError, SimulationConfig};
use crate::tick::{self, FleetStats, SimulationState, TickError};

/// Errors surfaced by the simulation facade.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration failed validation.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The floor could not be built.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// The fleet or learner could not be built, or a command named an
    /// unknown robot.
    #[error("control error: {source}")]
    Control {
        /// The underlying control error.
        #[from]
        source: ControlError,
    },

    /// A tick was rejected.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// Snapshot serialization failed.
    #[error("snapshot serialization failed: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// A complete, serializable view of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Ticks completed.
    pub tick: u64,
    /// Simulated milliseconds elapsed.
    pub elapsed_ms: u64,
    /// Robots in id order.
    pub robots: Vec<Robot>,
    /// Active tasks in submission order.
    pub tasks: Vec<Task>,
    /// Congestion zones, row-major.
    pub zones: Vec<CongestionZone>,
    /// Learner telemetry.
    pub learning: LearningMetrics,
    /// Cumulative totals.
    pub stats: FleetStats,
}

impl SimulationSnapshot {
    /// Serialize to a JSON string for hosts.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Serialize`] if encoding fails.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The warehouse fleet simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
}

impl Simulation {
    /// Validate the configuration and build the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the configuration is invalid or a
    /// start position cannot be claimed.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let state = build_state(&config)?;
        info!(
            name = %config.world.name,
            width = config.grid.width,
            height = config.grid.height,
            robots = state.fleet.robots().len(),
            zones = state.learner.zones().len(),
            "simulation created"
        );
        Ok(Self { config, state })
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The live state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Advance by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Tick`] for invalid inputs; state is left
    /// unchanged.
    pub fn tick(
        &mut self,
        delta_time: f64,
        speed_multiplier: f64,
    ) -> Result<TickMetrics, SimulationError> {
        Ok(tick::run_tick(
            &mut self.state,
            &self.config,
            delta_time,
            speed_multiplier,
        )?)
    }

    /// Advance by one tick using the configured delta time and multiplier.
    ///
    /// # Errors
    ///
    /// See [`Simulation::tick`].
    pub fn step(&mut self) -> Result<TickMetrics, SimulationError> {
        let world = &self.config.world;
        let (delta_time, speed_multiplier) = (world.delta_time_seconds, world.speed_multiplier);
        self.tick(delta_time, speed_multiplier)
    }

    /// Enqueue a pending task. Unreachable targets are accepted and simply
    /// stay pending.
    pub fn submit_task(&mut self, request: TaskRequest) -> TaskId {
        let now_ms = self.state.clock.elapsed_ms();
        self.state.fleet.submit(request, now_ms)
    }

    /// Robots in id order.
    pub fn robot_states(&self) -> &[Robot] {
        self.state.fleet.robots()
    }

    /// Congestion zones, row-major.
    pub fn zones(&self) -> &[CongestionZone] {
        self.state.learner.zones()
    }

    /// Learner telemetry.
    pub fn learning_metrics(&self) -> LearningMetrics {
        self.state.learner.get_metrics()
    }

    /// Active tasks in submission order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.state.fleet.tasks().collect()
    }

    /// Look up one task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.state.fleet.task(id)
    }

    /// The floor and its current occupancy.
    pub const fn grid(&self) -> &WarehouseGrid {
        &self.state.grid
    }

    /// Cumulative totals since the last reset.
    pub const fn stats(&self) -> &FleetStats {
        &self.state.stats
    }

    /// Ticks completed since the last reset.
    pub const fn tick_count(&self) -> u64 {
        self.state.clock.tick()
    }

    /// A complete serializable view.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.state.clock.tick(),
            elapsed_ms: self.state.clock.elapsed_ms(),
            robots: self.state.fleet.robots().to_vec(),
            tasks: self.state.fleet.tasks().cloned().collect(),
            zones: self.state.learner.zones().to_vec(),
            learning: self.state.learner.get_metrics(),
            stats: self.state.stats,
        }
    }

    /// Restore the initial fleet and clear tasks, zones, learner state, and
    /// time. The new state is built before the old one is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the state cannot be rebuilt.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        let fresh = build_state(&self.config)?;
        let previous_tick = self.state.clock.tick();
        self.state = fresh;
        info!(previous_tick, "simulation reset");
        Ok(())
    }

    /// Send a robot to charge. Its task returns to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Control`] for an unknown robot.
    pub fn recall_robot(&mut self, id: RobotId) -> Result<(), SimulationError> {
        let task = self.state.fleet.release_robot(id, RobotStatus::Charging)?;
        info!(robot = %id, requeued = ?task, "robot recalled");
        Ok(())
    }

    /// Mark a robot faulted. Its task returns to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Control`] for an unknown robot.
    pub fn report_fault(&mut self, id: RobotId) -> Result<(), SimulationError> {
        let task = self.state.fleet.release_robot(id, RobotStatus::Error)?;
        tracing::warn!(robot = %id, requeued = ?task, "robot faulted");
        Ok(())
    }

    /// Return a charging or faulted robot to `Idle`. Moving and idle robots
    /// are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Control`] for an unknown robot.
    pub fn return_to_service(&mut self, id: RobotId) -> Result<(), SimulationError> {
        let robot = self
            .state
            .fleet
            .robot_mut(id)
            .ok_or(ControlError::RobotNotFound(id))?;
        if matches!(robot.status, RobotStatus::Charging | RobotStatus::Error) {
            robot.status = RobotStatus::Idle;
            info!(robot = %id, "robot returned to service");
        }
        Ok(())
    }
}

/// Build grid, fleet, and learner from a validated configuration.
fn build_state(config: &SimulationConfig) -> Result<SimulationState, SimulationError> {
    let mut grid = build_grid(config.grid.width, config.grid.height, config.grid.layout)?;
    let fleet = Fleet::new(
        &config.fleet.start_positions,
        config.fleet.initial_battery,
        config.fleet.initial_speed,
        &mut grid,
    )?;
    let learner = CongestionLearner::new(
        config.grid.width,
        config.grid.height,
        config.congestion.clone(),
    )?;
    Ok(SimulationState {
        clock: SimClock::new(),
        grid,
        fleet,
        learner,
        stats: FleetStats::default(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_types::{GridCell, TaskPriority, TaskStatus, TaskType};

    use super::*;

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default()).unwrap()
    }

    fn far_task() -> TaskRequest {
        TaskRequest {
            task_type: TaskType::Delivery,
            position: GridCell::new(17, 6),
            priority: TaskPriority::High,
        }
    }

    #[test]
    fn default_simulation_has_five_idle_robots() {
        let s = sim();
        assert_eq!(s.robot_states().len(), 5);
        assert!(s.robot_states().iter().all(|r| r.status == RobotStatus::Idle));
        assert_eq!(s.zones().len(), 30);
        assert_eq!(s.tick_count(), 0);
    }

    #[test]
    fn start_on_obstacle_is_rejected() {
        let mut config = SimulationConfig::default();
        config.fleet.start_positions = vec![GridCell::new(5, 3)];
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Control { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.congestion.zone_size = 0;
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Config { .. })
        ));
    }

    #[test]
    fn recall_requeues_and_return_restores() {
        let mut s = sim();
        let task = s.submit_task(far_task());
        let _ = s.step().unwrap();
        let carrier = s.task(task).and_then(|t| t.assigned_robot).unwrap();

        s.recall_robot(carrier).unwrap();
        assert_eq!(s.task(task).unwrap().status, TaskStatus::Pending);
        let robot = s.robot_states().get(carrier.index()).unwrap();
        assert_eq!(robot.status, RobotStatus::Charging);
        assert!(robot.path.is_empty());

        // The task goes to someone else on the next tick.
        let _ = s.step().unwrap();
        let next = s.task(task).and_then(|t| t.assigned_robot).unwrap();
        assert_ne!(next, carrier);

        s.return_to_service(carrier).unwrap();
        assert_eq!(
            s.robot_states().get(carrier.index()).map(|r| r.status),
            Some(RobotStatus::Idle)
        );
    }

    #[test]
    fn unknown_robot_commands_fail() {
        let mut s = sim();
        assert!(s.recall_robot(RobotId::new(99)).is_err());
        assert!(s.report_fault(RobotId::new(99)).is_err());
        assert!(s.return_to_service(RobotId::new(99)).is_err());
    }

    #[test]
    fn snapshot_serializes() {
        let mut s = sim();
        let _ = s.submit_task(far_task());
        let _ = s.step().unwrap();
        let json = s.snapshot().to_json().unwrap();
        assert!(json.contains("\"robots\""));
        let back: SimulationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tick, 1);
        assert_eq!(back.tasks.len(), 1);
    }
}
