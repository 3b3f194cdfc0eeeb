//! Core entity structs for the fleet simulation.
//!
//! Covers positions, grid cells, robots, tasks, congestion zones, and the
//! per-tick metric payloads handed to the host application.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CellKind, CollisionKind, RobotStatus, TaskPriority, TaskStatus, TaskType};
use crate::ids::{RobotId, TaskId, ZoneId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A continuous `(x, y)` coordinate in grid units.
///
/// Robots hold fractional positions while interpolating between the integer
/// cells of their path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate (column axis).
    pub x: f64,
    /// Vertical coordinate (row axis).
    pub y: f64,
}

impl Position {
    /// Create a position from raw coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line (Euclidean) distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between two positions.
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Move toward `target` by exactly `step` units along the connecting
    /// bearing. The caller guarantees `step` is shorter than the distance.
    pub fn step_toward(&self, target: &Self, step: f64) -> Self {
        let distance = self.distance_to(target);
        if distance <= f64::EPSILON {
            return *target;
        }
        let ratio = step / distance;
        Self::new(
            (target.x - self.x).mul_add(ratio, self.x),
            (target.y - self.y).mul_add(ratio, self.y),
        )
    }
}

/// An integer cell coordinate on the warehouse grid.
///
/// Path waypoints, task targets, and grid occupancy are all expressed in
/// cells; robots interpolate between them as [`Position`]s.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct GridCell {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl GridCell {
    /// Create a cell coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The continuous position at the centre of this cell.
    pub fn to_position(self) -> Position {
        Position::new(f64::from(self.x), f64::from(self.y))
    }

    /// Manhattan distance to another cell.
    pub const fn manhattan_to(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether two cells share an edge.
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan_to(other) == 1
    }
}

impl core::fmt::Display for GridCell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Grid cell state
// ---------------------------------------------------------------------------

/// One cell of the warehouse grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Permanent kind of the cell.
    pub kind: CellKind,
    /// Whether a robot currently holds this cell.
    pub occupied: bool,
    /// The robot holding this cell, if any.
    pub owner: Option<RobotId>,
}

impl Cell {
    /// A free cell of the given kind.
    pub const fn of_kind(kind: CellKind) -> Self {
        Self {
            kind,
            occupied: false,
            owner: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Robots
// ---------------------------------------------------------------------------

/// A mobile robot in the fleet.
///
/// Robots are created once at simulation start and mutated in place every
/// tick. They are never destroyed during a run; a reset replaces the whole
/// fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Robot {
    /// Stable identifier (equal to the fleet index).
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Current continuous position.
    pub position: Position,
    /// The grid cell this robot currently owns.
    pub cell: GridCell,
    /// Final cell of the current assignment, if moving.
    pub target_position: Option<GridCell>,
    /// Remaining waypoints; the front is the next cell to reach.
    #[ts(as = "Vec<GridCell>")]
    pub path: VecDeque<GridCell>,
    /// Operating status.
    pub status: RobotStatus,
    /// Battery charge in `[0, 100]`.
    pub battery: f64,
    /// Continuous speed multiplier (nominal `0.2..=1.2`).
    pub speed: f64,
    /// The task this robot is executing.
    pub current_task: Option<TaskId>,
    /// Consecutive ticks spent waiting on a waypoint owned by another robot.
    pub blocked_ticks: u32,
}

impl Robot {
    /// Create an idle robot standing on `cell`.
    pub fn new(id: RobotId, cell: GridCell, battery: f64, speed: f64) -> Self {
        Self {
            id,
            name: format!("Robot-{}", id.into_inner().saturating_add(1)),
            position: cell.to_position(),
            cell,
            target_position: None,
            path: VecDeque::new(),
            status: RobotStatus::Idle,
            battery,
            speed,
            current_task: None,
            blocked_ticks: 0,
        }
    }

    /// Whether the robot is moving along a non-empty path.
    pub fn is_travelling(&self) -> bool {
        self.status == RobotStatus::Moving && !self.path.is_empty()
    }

    /// Drop the current assignment: path, target, and task pointer.
    pub fn clear_assignment(&mut self) {
        self.path.clear();
        self.target_position = None;
        self.current_task = None;
        self.blocked_ticks = 0;
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A request from the host to enqueue new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TaskRequest {
    /// Kind of work.
    pub task_type: TaskType,
    /// Target cell.
    pub position: GridCell,
    /// Urgency.
    pub priority: TaskPriority,
}

/// A unit of work for the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    /// Stable identifier (submission order).
    pub id: TaskId,
    /// Kind of work.
    pub task_type: TaskType,
    /// Target cell.
    pub position: GridCell,
    /// Urgency.
    pub priority: TaskPriority,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Simulated time of submission, in milliseconds.
    pub created_at_ms: u64,
    /// Simulated time of completion, in milliseconds.
    pub completed_at_ms: Option<u64>,
    /// The robot executing this task.
    pub assigned_robot: Option<RobotId>,
}

impl Task {
    /// Create a pending task from a host request.
    pub const fn from_request(id: TaskId, request: TaskRequest, created_at_ms: u64) -> Self {
        Self {
            id,
            task_type: request.task_type,
            position: request.position,
            priority: request.priority,
            status: TaskStatus::Pending,
            created_at_ms,
            completed_at_ms: None,
            assigned_robot: None,
        }
    }

    /// Return the task to the pending pool, detached from any robot.
    pub const fn requeue(&mut self) {
        self.status = TaskStatus::Pending;
        self.assigned_robot = None;
    }
}

// ---------------------------------------------------------------------------
// Congestion zones
// ---------------------------------------------------------------------------

/// A fixed rectangular partition of the grid used to aggregate traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CongestionZone {
    /// Row-major zone index.
    pub id: ZoneId,
    /// Top-left cell of the zone.
    pub origin: GridCell,
    /// Width in cells (the last column of zones may be narrower).
    pub width: u32,
    /// Height in cells (the last row of zones may be shorter).
    pub height: u32,
    /// Robots of any status standing in the zone at the last analysis.
    pub robot_count: u32,
    /// Instantaneous congestion in `[0, 1]`.
    pub congestion_level: f64,
    /// Recent congestion levels, oldest first.
    #[ts(as = "Vec<f64>")]
    pub history: VecDeque<f64>,
    /// Recommended speed for robots in this zone.
    pub avg_speed: f64,
    /// Collisions recorded in this zone.
    pub collision_count: u32,
}

impl CongestionZone {
    /// Centre of the zone in grid units (nominal zone size, not clipped).
    pub fn center(&self, zone_size: u32) -> Position {
        let half = f64::from(zone_size) / 2.0;
        Position::new(f64::from(self.origin.x) + half, f64::from(self.origin.y) + half)
    }

    /// Mean of the recorded history, or `0.0` when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn historical_average(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        // History length is bounded by a small configured capacity.
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// A proximity event between two robots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollisionEvent {
    /// Severity tier.
    pub kind: CollisionKind,
    /// The robots involved, lower id first.
    pub robot_ids: Vec<RobotId>,
    /// Distance between the robots when the event fired.
    pub distance: f64,
    /// Human-readable summary for logs and dashboards.
    pub description: String,
}

/// Metrics delta produced by one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickMetrics {
    /// The tick that produced these metrics.
    pub tick: u64,
    /// Simulated milliseconds elapsed at the end of the tick.
    pub elapsed_ms: u64,
    /// Total distance moved by all robots this tick.
    pub distance_traveled: f64,
    /// Successful path computations this tick.
    pub paths_calculated: u32,
    /// Pairs of moving robots that were throttled inside the critical distance.
    pub collisions_avoided: u32,
    /// Near-miss events this tick.
    pub near_misses: u32,
    /// Critical-avoidance events this tick.
    pub critical_avoidances: u32,
    /// Tasks completed this tick.
    pub tasks_completed: u32,
    /// Collision events in detection order.
    pub events: Vec<CollisionEvent>,
}

/// Snapshot of the congestion learner for telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LearningMetrics {
    /// Mean congestion level across all zones.
    pub average_congestion: f64,
    /// Zones with congestion above the hot-zone threshold.
    pub congested_zones: u32,
    /// Current speed smoothing coefficient.
    pub learning_rate: f64,
    /// Percent improvement of average congestion against the baseline.
    pub efficiency_gain: f64,
    /// Ticks where a robot's own zone was congested.
    pub total_congestion_events: u64,
    /// Speed changes larger than the adjustment threshold.
    pub speed_adjustments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!(approx(a.distance_to(&b), 5.0));
    }

    #[test]
    fn step_toward_moves_exact_distance() {
        let a = Position::new(1.0, 1.0);
        let b = Position::new(1.0, 3.0);
        let moved = a.step_toward(&b, 0.5);
        assert!(approx(moved.x, 1.0));
        assert!(approx(moved.y, 1.5));
    }

    #[test]
    fn cell_adjacency_is_four_connected() {
        let c = GridCell::new(4, 4);
        assert!(c.is_adjacent(GridCell::new(5, 4)));
        assert!(c.is_adjacent(GridCell::new(4, 3)));
        assert!(!c.is_adjacent(GridCell::new(5, 5)));
        assert!(!c.is_adjacent(c));
    }

    #[test]
    fn new_robot_is_idle_on_its_cell() {
        let robot = Robot::new(RobotId::new(0), GridCell::new(2, 2), 100.0, 1.0);
        assert_eq!(robot.status, RobotStatus::Idle);
        assert_eq!(robot.position, Position::new(2.0, 2.0));
        assert_eq!(robot.name, "Robot-1");
        assert!(!robot.is_travelling());
    }

    #[test]
    fn requeue_detaches_task() {
        let request = TaskRequest {
            task_type: TaskType::Scan,
            position: GridCell::new(1, 1),
            priority: TaskPriority::Low,
        };
        let mut task = Task::from_request(TaskId::new(0), request, 0);
        task.status = TaskStatus::InProgress;
        task.assigned_robot = Some(RobotId::new(2));
        task.requeue();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assigned_robot, None);
    }
}
