//! Enumeration types for the fleet simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// What occupies a grid cell permanently.
///
/// Only [`CellKind::Obstacle`] blocks movement. The other kinds are labels
/// used by task generators and renderers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum CellKind {
    /// Open floor.
    #[default]
    Empty,
    /// Impassable structure (shelving, pillars, walls).
    Obstacle,
    /// Storage face beside a shelving block.
    Storage,
    /// Charging station.
    Charging,
    /// Inbound pickup point.
    Pickup,
    /// Outbound delivery point.
    Delivery,
}

impl CellKind {
    /// Whether a robot may ever stand on a cell of this kind.
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

// ---------------------------------------------------------------------------
// Robots
// ---------------------------------------------------------------------------

/// Operating status of a robot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum RobotStatus {
    /// Waiting for work.
    #[default]
    Idle,
    /// Following a planned path.
    Moving,
    /// Recalled to charge; does not move and is not assigned work.
    Charging,
    /// Faulted; does not move and is not assigned work.
    Error,
}

impl RobotStatus {
    /// Whether a robot in this status may receive a new task.
    pub const fn accepts_tasks(self) -> bool {
        matches!(self, Self::Idle)
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// The kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskType {
    /// Collect an item at the target cell.
    Pickup,
    /// Drop an item at the target cell.
    Delivery,
    /// Inventory scan at the target cell.
    Scan,
}

/// Task urgency. Ordinal: `Low` < `Medium` < `High` < `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskPriority {
    /// Background work.
    Low,
    /// Normal work.
    Medium,
    /// Expedited work.
    High,
    /// Must be served first and may exceed nominal speed.
    Critical,
}

impl TaskPriority {
    /// Right-of-way rank used in collision arbitration (1..=4).
    ///
    /// Robots without a task have rank 0.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

/// Lifecycle state of a task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum TaskStatus {
    /// Waiting for a robot and a path.
    #[default]
    Pending,
    /// Matched to a robot this tick.
    Assigned,
    /// The robot is travelling to the target.
    InProgress,
    /// The robot reached the target.
    Completed,
    /// The task was abandoned and will not be retried.
    Failed,
}

// ---------------------------------------------------------------------------
// Collision events
// ---------------------------------------------------------------------------

/// Severity tier of a proximity event between two robots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CollisionKind {
    /// A robot closed within the warning distance of another.
    NearMiss,
    /// Two moving robots came within the critical distance and were throttled.
    CollisionAvoided,
    /// Two robots came within the collision distance; one was forced to yield.
    CriticalAvoidance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_is_ordinal() {
        assert_eq!(TaskPriority::Low.rank(), 1);
        assert_eq!(TaskPriority::Critical.rank(), 4);
        assert!(TaskPriority::High > TaskPriority::Medium);
    }

    #[test]
    fn only_obstacles_block() {
        assert!(!CellKind::Obstacle.is_passable());
        assert!(CellKind::Storage.is_passable());
        assert!(CellKind::Charging.is_passable());
    }

    #[test]
    fn only_idle_robots_accept_tasks() {
        assert!(RobotStatus::Idle.accepts_tasks());
        assert!(!RobotStatus::Moving.accepts_tasks());
        assert!(!RobotStatus::Charging.accepts_tasks());
        assert!(!RobotStatus::Error.accepts_tasks());
    }
}
