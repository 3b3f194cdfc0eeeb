//! Error types for the fleet-control crate.
//!
//! Steady-state control never fails: blocked robots wait and unroutable
//! tasks stay pending. These errors cover construction and host commands
//! that name an unknown robot or task.

use fleet_grid::GridError;
use fleet_types::{RobotId, TaskId};

/// Errors that can occur while building or commanding the fleet.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Zones must be at least one cell wide.
    #[error("zone size must be at least 1")]
    InvalidZoneSize,

    /// The congestion history must hold at least one sample.
    #[error("congestion history capacity must be at least 1")]
    InvalidHistoryCapacity,

    /// The learner was sized for an empty grid.
    #[error("invalid grid dimensions {width}x{height} for zone partitioning")]
    InvalidGridSize {
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// More robots were requested than ids can address.
    #[error("fleet of {0} robots exceeds the id range")]
    FleetTooLarge(usize),

    /// Robot with the given id was not found in the fleet.
    #[error("robot not found: {0}")]
    RobotNotFound(RobotId),

    /// Task with the given id was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A start cell could not be claimed.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}
