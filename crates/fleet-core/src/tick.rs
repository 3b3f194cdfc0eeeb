//! Tick cycle: the fixed phase sequence that advances the fleet.
//!
//! Each tick runs, in order:
//!
//! 1. **Clock** -- validate inputs, advance tick counter and simulated time.
//! 2. **Start** -- tasks assigned on the previous tick become `InProgress`.
//! 3. **Congestion** -- recompute zone levels from robot positions.
//! 4. **Motion** -- for each moving robot in id order: smooth its speed
//!    toward the adaptive target, then advance it along its path. Grid
//!    ownership changes as each robot moves, so later robots see earlier
//!    robots' new cells.
//! 5. **Collision** -- all-pairs arbitration over the moved fleet; collision
//!    sites feed back into the learner.
//! 6. **Assignment** -- pending tasks matched to idle robots.
//! 7. **Housekeeping** -- purge expired completed tasks, latch the efficiency
//!    baseline once eligible, fold the tick into cumulative stats.
//!
//! The cycle is deterministic for a given state and input sequence.

use fleet_control::{
    CongestionLearner, Fleet, MotionConfig, MotionStep, advance_robot, arbitrate, assign_pending,
};
use fleet_grid::WarehouseGrid;
use fleet_types::{RobotStatus, TickMetrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The global speed multiplier is negative, NaN, or infinite.
    #[error("invalid speed multiplier: {0}")]
    InvalidSpeedMultiplier(f64),
}

/// Running totals across all ticks since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Tasks completed.
    pub tasks_completed: u64,
    /// Tasks dropped by blocked robots and returned to the queue.
    pub tasks_abandoned: u64,
    /// Moving pairs throttled inside the critical distance.
    pub collisions_avoided: u64,
    /// Near-miss events.
    pub near_misses: u64,
    /// Critical-avoidance events.
    pub critical_avoidances: u64,
    /// Distance moved by all robots.
    pub total_distance: f64,
    /// Successful path computations.
    pub paths_calculated: u64,
}

impl FleetStats {
    /// Fold one tick's metrics into the totals.
    pub fn record(&mut self, metrics: &TickMetrics) {
        self.ticks = self.ticks.saturating_add(1);
        self.tasks_completed = self
            .tasks_completed
            .saturating_add(u64::from(metrics.tasks_completed));
        self.collisions_avoided = self
            .collisions_avoided
            .saturating_add(u64::from(metrics.collisions_avoided));
        self.near_misses = self.near_misses.saturating_add(u64::from(metrics.near_misses));
        self.critical_avoidances = self
            .critical_avoidances
            .saturating_add(u64::from(metrics.critical_avoidances));
        self.total_distance += metrics.distance_traveled;
        self.paths_calculated = self
            .paths_calculated
            .saturating_add(u64::from(metrics.paths_calculated));
    }
}

/// Task success ratio fed to the learner:
/// `completed / (completed + collisions_avoided + 1)`.
#[allow(clippy::cast_precision_loss)]
pub fn success_ratio(completed: u64, collisions_avoided: u64) -> f64 {
    let attempts = completed.saturating_add(collisions_avoided).saturating_add(1);
    // Counters stay far below 2^52 in any realistic run.
    completed as f64 / attempts as f64
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Tick counter and simulated time.
    pub clock: SimClock,
    /// The warehouse floor and its occupancy.
    pub grid: WarehouseGrid,
    /// Robots and tasks.
    pub fleet: Fleet,
    /// Zone congestion and learning state.
    pub learner: CongestionLearner,
    /// Cumulative totals.
    pub stats: FleetStats,
}

/// Execute a single tick.
///
/// # Errors
///
/// Returns [`TickError`] if `delta_time` or `speed_multiplier` is invalid or
/// the clock would overflow. No state changes in that case.
pub fn run_tick(
    state: &mut SimulationState,
    config: &SimulationConfig,
    delta_time: f64,
    speed_multiplier: f64,
) -> Result<TickMetrics, TickError> {
    if !speed_multiplier.is_finite() || speed_multiplier < 0.0 {
        return Err(TickError::InvalidSpeedMultiplier(speed_multiplier));
    }
    let tick = state.clock.advance(delta_time)?;
    let now_ms = state.clock.elapsed_ms();
    let mut metrics = TickMetrics {
        tick,
        elapsed_ms: now_ms,
        ..TickMetrics::default()
    };

    state.fleet.promote_assigned();

    state.learner.analyze(state.fleet.robots());

    let step = MotionStep {
        delta_time,
        speed_multiplier,
    };
    move_robots(state, &config.motion, step, &mut metrics);

    let ranks = state.fleet.priority_ranks();
    let report = arbitrate(state.fleet.robots_mut(), &ranks, &config.motion);
    for site in &report.collision_sites {
        state.learner.record_collision(site);
    }
    metrics.collisions_avoided = report.collisions_avoided;
    metrics.near_misses = report.near_misses;
    metrics.critical_avoidances = report.critical_avoidances;
    metrics.events = report.events;

    let assignment = assign_pending(&mut state.fleet, &state.grid);
    metrics.paths_calculated = assignment.paths_calculated;

    let purged = state.fleet.purge_completed(now_ms, config.tasks.retention_ms);
    if tick >= config.simulation.baseline_tick {
        state.learner.capture_baseline();
    }
    state.stats.record(&metrics);

    debug!(
        tick,
        distance = metrics.distance_traveled,
        completed = metrics.tasks_completed,
        assigned = assignment.assignments.len(),
        events = metrics.events.len(),
        purged,
        "tick complete"
    );
    Ok(metrics)
}

/// Motion phase: adaptive speed then path advance, one robot at a time.
fn move_robots(
    state: &mut SimulationState,
    motion: &MotionConfig,
    step: MotionStep,
    metrics: &mut TickMetrics,
) {
    let now_ms = state.clock.elapsed_ms();
    for index in 0..state.fleet.robots().len() {
        let Some(robot) = state.fleet.robots().get(index) else {
            continue;
        };
        if robot.status != RobotStatus::Moving {
            continue;
        }
        let id = robot.id;
        let priority = state.fleet.task_priority(robot);
        let speed = state
            .learner
            .get_adaptive_speed(robot, priority, state.fleet.robots());

        let Some(robot) = state.fleet.robot_mut(id) else {
            continue;
        };
        robot.speed = speed;
        let outcome = advance_robot(robot, &mut state.grid, step, motion);
        metrics.distance_traveled += outcome.distance;

        if let Some(task) = outcome.completed_task {
            state.fleet.complete_task(task, now_ms);
            metrics.tasks_completed = metrics.tasks_completed.saturating_add(1);
            let completed = state
                .stats
                .tasks_completed
                .saturating_add(u64::from(metrics.tasks_completed));
            let ratio = success_ratio(completed, state.stats.collisions_avoided);
            state.learner.update_learning_rate(ratio);
            info!(robot = %id, task = %task, at_ms = now_ms, "task completed");
        }
        if let Some(task) = outcome.abandoned_task {
            state.fleet.requeue_task(task);
            state.stats.tasks_abandoned = state.stats.tasks_abandoned.saturating_add(1);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use fleet_control::CongestionConfig;
    use fleet_control::congestion::RATE_BOOST;
    use fleet_grid::{LayoutKind, build_grid};
    use fleet_types::{
        CollisionKind, GridCell, Position, RobotId, TaskPriority, TaskRequest, TaskStatus,
        TaskType,
    };

    use super::*;

    fn state_with(cells: &[GridCell]) -> SimulationState {
        let mut grid = build_grid(18, 14, LayoutKind::Default).unwrap();
        let fleet = Fleet::new(cells, 100.0, 1.0, &mut grid).unwrap();
        let learner = CongestionLearner::new(18, 14, CongestionConfig::default()).unwrap();
        SimulationState {
            clock: SimClock::new(),
            grid,
            fleet,
            learner,
            stats: FleetStats::default(),
        }
    }

    fn request(x: u32, y: u32) -> TaskRequest {
        TaskRequest {
            task_type: TaskType::Scan,
            position: GridCell::new(x, y),
            priority: TaskPriority::Medium,
        }
    }

    #[test]
    fn invalid_inputs_leave_state_untouched() {
        let mut state = state_with(&[GridCell::new(2, 2)]);
        let before = state.clone();
        let config = SimulationConfig::default();
        assert!(matches!(
            run_tick(&mut state, &config, 0.05, -1.0),
            Err(TickError::InvalidSpeedMultiplier(_))
        ));
        assert!(matches!(
            run_tick(&mut state, &config, f64::NAN, 1.0),
            Err(TickError::Clock { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn assignment_then_progress_on_next_tick() {
        let mut state = state_with(&[GridCell::new(2, 2)]);
        let config = SimulationConfig::default();
        let task = state.fleet.submit(request(3, 2), 0);

        let first = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        assert_eq!(first.paths_calculated, 1);
        assert_eq!(state.fleet.task(task).unwrap().status, TaskStatus::Assigned);

        let _ = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        assert_eq!(state.fleet.task(task).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn short_task_completes_and_updates_stats() {
        let mut state = state_with(&[GridCell::new(2, 2)]);
        let config = SimulationConfig::default();
        let task = state.fleet.submit(request(4, 2), 0);
        for _ in 0..6 {
            let _ = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        }
        assert_eq!(state.fleet.task(task).unwrap().status, TaskStatus::Completed);
        assert_eq!(state.stats.tasks_completed, 1);
        assert!((state.stats.total_distance - 2.0).abs() < 1e-9);
        let robot = state.fleet.robot(RobotId::new(0)).unwrap();
        assert_eq!(robot.status, RobotStatus::Idle);
        assert_eq!(robot.cell, GridCell::new(4, 2));
        assert_eq!(state.grid.owner(GridCell::new(4, 2)), Some(robot.id));
        assert_eq!(state.grid.owner(GridCell::new(2, 2)), None);
    }

    #[test]
    fn completed_tasks_purged_after_retention() {
        let mut state = state_with(&[GridCell::new(2, 2)]);
        let config = SimulationConfig::default();
        let task = state.fleet.submit(request(3, 2), 0);
        // 3000 ms retention at 50 ms per tick.
        for _ in 0..70 {
            let _ = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        }
        assert!(state.fleet.task(task).is_none());
        assert_eq!(state.stats.tasks_completed, 1);
    }

    #[test]
    fn completion_retunes_learning_rate() {
        let mut state = state_with(&[GridCell::new(2, 2)]);
        let config = SimulationConfig::default();
        let initial = state.learner.learning_rate();
        let task = state.fleet.submit(request(4, 2), 0);
        for _ in 0..6 {
            let _ = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        }
        assert_eq!(state.fleet.task(task).unwrap().status, TaskStatus::Completed);
        // One completion, no collisions: ratio 1/2 is below the low-success
        // threshold, so the rate is boosted exactly once.
        assert!((state.learner.learning_rate() - initial * RATE_BOOST).abs() < 1e-12);
    }

    #[test]
    fn critical_pair_feeds_the_learner() {
        let mut state = state_with(&[GridCell::new(2, 2), GridCell::new(3, 2)]);
        let config = SimulationConfig::default();
        let initial = state.learner.learning_rate();
        if let Some(robot) = state.fleet.robots_mut().get_mut(1) {
            robot.position = Position::new(2.3, 2.0);
        }

        let metrics = run_tick(&mut state, &config, 0.05, 1.0).unwrap();
        assert_eq!(metrics.critical_avoidances, 1);
        assert_eq!(
            metrics.events.first().map(|e| e.kind),
            Some(CollisionKind::CriticalAvoidance)
        );
        assert_eq!(state.stats.critical_avoidances, 1);

        // Equal ranks: the higher index yields.
        assert_eq!(
            state.fleet.robot(RobotId::new(1)).unwrap().speed,
            config.motion.yield_speed
        );

        let site = Position::new(2.15, 2.0);
        assert_eq!(state.learner.zone_for(&site).unwrap().collision_count, 1);
        let total: u32 = state
            .learner
            .zones()
            .iter()
            .map(|z| z.collision_count)
            .sum();
        assert_eq!(total, 1);
        assert!((state.learner.learning_rate() - initial * RATE_BOOST).abs() < 1e-12);
    }

    #[test]
    fn success_ratio_formula() {
        assert_eq!(success_ratio(0, 0), 0.0);
        assert_eq!(success_ratio(3, 0), 0.75);
        assert_eq!(success_ratio(1, 2), 0.25);
    }

    #[test]
    fn stats_accumulate() {
        let mut stats = FleetStats::default();
        let metrics = TickMetrics {
            distance_traveled: 1.5,
            near_misses: 2,
            paths_calculated: 1,
            ..TickMetrics::default()
        };
        stats.record(&metrics);
        stats.record(&metrics);
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.near_misses, 4);
        assert_eq!(stats.paths_calculated, 2);
        assert_eq!(stats.total_distance, 3.0);
    }
}
