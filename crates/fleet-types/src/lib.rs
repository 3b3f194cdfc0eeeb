//! Shared type definitions for the warehouse fleet simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the host dashboard, which renders robot, task, and zone state.
//!
//! # Modules
//!
//! - [`ids`] -- Stable integer id wrappers for robots, tasks, and zones
//! - [`enums`] -- Cell kinds, robot/task status, priorities, collision tiers
//! - [`structs`] -- Positions, cells, robots, tasks, zones, and metrics

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CellKind, CollisionKind, RobotStatus, TaskPriority, TaskStatus, TaskType};
pub use ids::{RobotId, TaskId, ZoneId};
pub use structs::{
    Cell, CollisionEvent, CongestionZone, GridCell, LearningMetrics, Position, Robot, Task,
    TaskRequest, TickMetrics,
};
