//! Per-robot motion along a planned path.
//!
//! A moving robot travels `speed * multiplier * delta_time * 60` grid units
//! per tick toward the front waypoint. When the waypoint is within reach it
//! snaps onto it, claims the new cell, releases the old one, and pops the
//! waypoint. At most one waypoint is reached per tick.
//!
//! A waypoint held by another robot is never entered. The robot holds its
//! position and counts blocked ticks; past the configured limit it drops the
//! assignment so the task can be planned afresh.

use fleet_grid::WarehouseGrid;
use fleet_types::{GridCell, Robot, RobotStatus, TaskId};

use crate::config::MotionConfig;

/// Ticks per second that speeds are normalized to.
pub const REFERENCE_TICK_RATE: f64 = 60.0;

/// Time scaling for one tick of motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Simulated seconds covered by the tick.
    pub delta_time: f64,
    /// Global speed multiplier set by the host.
    pub speed_multiplier: f64,
}

impl MotionStep {
    /// Distance a robot at `speed` covers this tick.
    pub fn move_distance(&self, speed: f64) -> f64 {
        speed * self.speed_multiplier * self.delta_time * REFERENCE_TICK_RATE
    }

    /// Battery drained by one tick of movement.
    pub fn battery_drain(&self, per_second: f64) -> f64 {
        per_second * self.delta_time * self.speed_multiplier
    }
}

/// What happened to one robot during its motion step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionOutcome {
    /// Distance covered this tick.
    pub distance: f64,
    /// Waypoint snapped onto this tick.
    pub reached: Option<GridCell>,
    /// Task finished because the path emptied.
    pub completed_task: Option<TaskId>,
    /// The next waypoint was held by another robot.
    pub blocked: bool,
    /// Task dropped after waiting too long on a blocked waypoint.
    pub abandoned_task: Option<TaskId>,
}

/// Advance one robot by a tick.
///
/// Only `Moving` robots move; `Idle`, `Charging`, and `Error` robots are
/// left untouched. Task bookkeeping is reported in the outcome for the
/// caller to apply.
pub fn advance_robot(
    robot: &mut Robot,
    grid: &mut WarehouseGrid,
    step: MotionStep,
    config: &MotionConfig,
) -> MotionOutcome {
    let mut outcome = MotionOutcome::default();
    if robot.status != RobotStatus::Moving {
        return outcome;
    }
    let Some(&waypoint) = robot.path.front() else {
        outcome.completed_task = stand_down(robot);
        return outcome;
    };

    if let Some(owner) = grid.owner(waypoint).filter(|&owner| owner != robot.id) {
        tracing::trace!(robot = %robot.id, %waypoint, %owner, "waypoint held");
        return hold(robot, config);
    }

    let target = waypoint.to_position();
    let reach = step.move_distance(robot.speed);
    let remaining = robot.position.distance_to(&target);

    if remaining <= reach {
        if let Err(err) = grid.claim(waypoint, robot.id) {
            tracing::warn!(robot = %robot.id, %waypoint, error = %err, "waypoint unusable, dropping path");
            outcome.abandoned_task = stand_down(robot);
            return outcome;
        }
        let previous = robot.cell;
        if previous != waypoint {
            grid.release(previous, robot.id);
        }
        robot.cell = waypoint;
        robot.position = target;
        robot.path.pop_front();
        outcome.distance = remaining;
        outcome.reached = Some(waypoint);
        if robot.path.is_empty() {
            outcome.completed_task = stand_down(robot);
        }
    } else {
        robot.position = robot.position.step_toward(&target, reach);
        outcome.distance = reach;
    }

    robot.blocked_ticks = 0;
    robot.battery = (robot.battery - step.battery_drain(config.battery_drain_per_second)).max(0.0);
    tracing::trace!(
        robot = %robot.id,
        x = robot.position.x,
        y = robot.position.y,
        distance = outcome.distance,
        "robot advanced"
    );
    outcome
}

/// Go idle and hand back whatever task the robot carried.
fn stand_down(robot: &mut Robot) -> Option<TaskId> {
    let task = robot.current_task;
    robot.clear_assignment();
    robot.status = RobotStatus::Idle;
    task
}

fn hold(robot: &mut Robot, config: &MotionConfig) -> MotionOutcome {
    robot.blocked_ticks = robot.blocked_ticks.saturating_add(1);
    let mut outcome = MotionOutcome {
        blocked: true,
        ..MotionOutcome::default()
    };
    if robot.blocked_ticks >= config.max_blocked_ticks {
        tracing::warn!(
            robot = %robot.id,
            ticks = robot.blocked_ticks,
            task = ?robot.current_task,
            "blocked too long, abandoning assignment"
        );
        outcome.abandoned_task = stand_down(robot);
    }
    outcome
}
