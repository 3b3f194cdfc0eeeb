//! Warehouse floor layouts.
//!
//! The default layout is drawn for an 18x14 floor:
//!
//! ```text
//!   x: 0 1 2 3 4 5 6 7 8 9 ...        C = charging   # = shelving (obstacle)
//! y 0  C C . . . . . . . . . . . . . . C C
//!   1  . . . . . . . . . . . . . . . . . .
//!   2  . . R . . . . . . . . . . . . . . .
//!   3  . . . . S # # S . . S # # S . . . .     S = storage face
//!   ...
//!   6  P . . . . . . . . . . . . . . . . D     P = pickup, D = delivery
//! ```
//!
//! Four 2x3 shelving blocks sit in two rows with storage faces on both
//! sides. Charging stations occupy the top corners, pickup points the west
//! wall, and delivery points the east wall. Features that fall outside a
//! smaller floor are skipped, so any non-zero size yields a valid grid.

use fleet_types::{CellKind, GridCell};
use serde::Deserialize;

use crate::error::GridError;
use crate::grid::WarehouseGrid;

/// Selects which floor plan to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Shelving blocks, storage faces, chargers, pickup and delivery points.
    #[default]
    Default,
    /// An empty floor with no features.
    Open,
}

/// An inclusive rectangle of cells sharing one kind.
#[derive(Debug, Clone, Copy)]
struct Feature {
    kind: CellKind,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

const fn feature(kind: CellKind, x0: u32, y0: u32, x1: u32, y1: u32) -> Feature {
    Feature { kind, x0, y0, x1, y1 }
}

/// Features of the default floor plan, applied in order.
const DEFAULT_FEATURES: [Feature; 16] = [
    // Shelving blocks
    feature(CellKind::Obstacle, 5, 3, 6, 5),
    feature(CellKind::Obstacle, 11, 3, 12, 5),
    feature(CellKind::Obstacle, 5, 8, 6, 10),
    feature(CellKind::Obstacle, 11, 8, 12, 10),
    // Storage faces either side of each block
    feature(CellKind::Storage, 4, 3, 4, 5),
    feature(CellKind::Storage, 7, 3, 7, 5),
    feature(CellKind::Storage, 10, 3, 10, 5),
    feature(CellKind::Storage, 13, 3, 13, 5),
    feature(CellKind::Storage, 4, 8, 4, 10),
    feature(CellKind::Storage, 7, 8, 7, 10),
    feature(CellKind::Storage, 10, 8, 10, 10),
    feature(CellKind::Storage, 13, 8, 13, 10),
    // Chargers, pickup, delivery
    feature(CellKind::Charging, 0, 0, 1, 0),
    feature(CellKind::Charging, 16, 0, 17, 0),
    feature(CellKind::Pickup, 0, 6, 0, 7),
    feature(CellKind::Delivery, 17, 6, 17, 7),
];

/// Default robot start cells for the default floor plan.
pub const DEFAULT_START_CELLS: [(u32, u32); 5] = [(2, 2), (15, 2), (2, 11), (8, 7), (9, 1)];

/// Build a grid of the given size with the selected floor plan.
///
/// # Errors
///
/// Returns [`GridError::InvalidDimensions`] if either dimension is zero.
pub fn build_grid(width: u32, height: u32, layout: LayoutKind) -> Result<WarehouseGrid, GridError> {
    let mut grid = WarehouseGrid::new(width, height)?;
    if layout == LayoutKind::Open {
        return Ok(grid);
    }

    let mut skipped: u32 = 0;
    for f in &DEFAULT_FEATURES {
        for y in f.y0..=f.y1 {
            for x in f.x0..=f.x1 {
                let cell = GridCell::new(x, y);
                if grid.contains(cell) {
                    grid.set_kind(cell, f.kind)?;
                } else {
                    skipped = skipped.saturating_add(1);
                }
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(width, height, skipped, "layout features clipped to floor size");
    }
    Ok(grid)
}

/// Default start cells as [`GridCell`]s.
pub fn default_start_cells() -> Vec<GridCell> {
    DEFAULT_START_CELLS
        .iter()
        .map(|&(x, y)| GridCell::new(x, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_grid() -> Option<WarehouseGrid> {
        build_grid(18, 14, LayoutKind::Default).ok()
    }

    #[test]
    fn default_layout_places_features() {
        let grid = default_grid();
        assert!(grid.is_some());
        let Some(grid) = grid else { return };
        assert_eq!(grid.cells_of_kind(CellKind::Obstacle).len(), 24);
        assert_eq!(grid.cells_of_kind(CellKind::Storage).len(), 24);
        assert_eq!(grid.cells_of_kind(CellKind::Charging).len(), 4);
        assert_eq!(grid.kind(GridCell::new(0, 6)), Some(CellKind::Pickup));
        assert_eq!(grid.kind(GridCell::new(17, 7)), Some(CellKind::Delivery));
    }

    #[test]
    fn default_start_cells_are_passable() {
        let Some(grid) = default_grid() else {
            return;
        };
        for cell in default_start_cells() {
            assert_eq!(grid.kind(cell), Some(CellKind::Empty), "start {cell}");
        }
    }

    #[test]
    fn small_floor_clips_features() {
        let grid = build_grid(6, 4, LayoutKind::Default);
        assert!(grid.is_ok());
        let obstacles = grid.map(|g| g.cells_of_kind(CellKind::Obstacle).len()).ok();
        // Only cell (5, 3) of the first shelving block fits.
        assert_eq!(obstacles, Some(1));
    }

    #[test]
    fn open_layout_is_empty() {
        let grid = build_grid(5, 5, LayoutKind::Open).ok();
        let passable = grid.map(|g| g.passable_cells().len());
        assert_eq!(passable, Some(25));
    }
}
