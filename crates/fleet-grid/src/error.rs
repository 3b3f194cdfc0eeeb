//! Error types for the `fleet-grid` crate.
//!
//! Pathfinding never fails with an error: an unreachable goal is signalled by
//! an empty path. [`GridError`] covers construction and occupancy misuse.

use fleet_types::{GridCell, RobotId};

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The grid was configured with a zero dimension.
    #[error("invalid grid dimensions {width}x{height}: both must be at least 1")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A cell lies outside the grid.
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending cell.
        cell: GridCell,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// A robot tried to claim an obstacle cell.
    #[error("cell {0} is an obstacle")]
    ObstacleCell(GridCell),

    /// A robot tried to claim a cell owned by another robot.
    #[error("cell {cell} is owned by {owner}, not {requester}")]
    CellOccupied {
        /// The contested cell.
        cell: GridCell,
        /// Current owner.
        owner: RobotId,
        /// Robot attempting the claim.
        requester: RobotId,
    },
}
