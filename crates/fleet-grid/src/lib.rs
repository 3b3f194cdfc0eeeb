//! Warehouse grid, floor layouts, and pathfinding for the fleet simulation.
//!
//! This crate models the physical floor: a rectangular cell grid with
//! permanent cell kinds and single-owner occupancy, the default warehouse
//! floor plan, and A* routing that respects both obstacles and other robots.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction and occupancy misuse.
//! - [`grid`] -- [`WarehouseGrid`]: cell storage, bounds, neighbours, claims.
//! - [`layout`] -- Default 18x14 floor plan and robot start cells.
//! - [`pathfinder`] -- Deterministic four-connected A* search.

pub mod error;
pub mod grid;
pub mod layout;
pub mod pathfinder;

// Re-export primary types at crate root.
pub use error::GridError;
pub use grid::WarehouseGrid;
pub use layout::{DEFAULT_START_CELLS, LayoutKind, build_grid, default_start_cells};
pub use pathfinder::{find_path, is_valid_path};
