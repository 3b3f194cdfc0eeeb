//! The warehouse floor: a rectangular grid of cells with occupancy tracking.
//!
//! Cells are stored row-major in a flat `Vec`. Each cell carries a permanent
//! [`CellKind`] and a single optional owner. Ownership is the only mutable
//! state shared between robots within a tick, so [`WarehouseGrid::claim`]
//! refuses to hand a cell to a second robot.

use fleet_types::{Cell, CellKind, GridCell, RobotId};

use crate::error::GridError;

/// Offsets of the four edge-sharing neighbours, in expansion order:
/// up, right, down, left.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// The warehouse grid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WarehouseGrid {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Row-major cell storage, `width * height` entries.
    cells: Vec<Cell>,
}

impl WarehouseGrid {
    /// Create an all-empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let len = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .map_err(|_err| GridError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::of_kind(CellKind::Empty); len],
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Flat index of a cell, or `None` when out of bounds.
    fn index(&self, cell: GridCell) -> Option<usize> {
        if cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        let row = usize::try_from(cell.y).ok()?;
        let col = usize::try_from(cell.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }

    fn out_of_bounds(&self, cell: GridCell) -> GridError {
        GridError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the cell lies inside the grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    /// Borrow a cell's state.
    pub fn cell(&self, cell: GridCell) -> Option<&Cell> {
        self.index(cell).and_then(|i| self.cells.get(i))
    }

    fn cell_mut(&mut self, cell: GridCell) -> Option<&mut Cell> {
        self.index(cell).and_then(|i| self.cells.get_mut(i))
    }

    /// The permanent kind of a cell.
    pub fn kind(&self, cell: GridCell) -> Option<CellKind> {
        self.cell(cell).map(|c| c.kind)
    }

    /// Change the permanent kind of a cell.
    ///
    /// Layouts are applied before robots are placed; this does not check
    /// occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for cells outside the grid.
    pub fn set_kind(&mut self, cell: GridCell, kind: CellKind) -> Result<(), GridError> {
        let err = self.out_of_bounds(cell);
        let slot = self.cell_mut(cell).ok_or(err)?;
        slot.kind = kind;
        Ok(())
    }

    /// The robot currently holding a cell.
    pub fn owner(&self, cell: GridCell) -> Option<RobotId> {
        self.cell(cell).and_then(|c| c.owner)
    }

    /// Whether a robot (other than `exclude`) may enter the cell: it must be
    /// in bounds, not an obstacle, and not held by another robot.
    pub fn is_traversable(&self, cell: GridCell, exclude: Option<RobotId>) -> bool {
        let Some(state) = self.cell(cell) else {
            return false;
        };
        if !state.kind.is_passable() {
            return false;
        }
        match state.owner {
            None => true,
            Some(owner) => Some(owner) == exclude,
        }
    }

    /// In-bounds edge neighbours of a cell, in up/right/down/left order.
    pub fn neighbors(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let x = u32::try_from(i64::from(cell.x).checked_add(dx)?).ok()?;
            let y = u32::try_from(i64::from(cell.y).checked_add(dy)?).ok()?;
            let next = GridCell::new(x, y);
            self.contains(next).then_some(next)
        })
    }

    /// Give `robot` ownership of a cell. Claiming a cell the robot already
    /// owns is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`], [`GridError::ObstacleCell`], or
    /// [`GridError::CellOccupied`] when the claim would break the
    /// one-owner-per-cell invariant.
    pub fn claim(&mut self, cell: GridCell, robot: RobotId) -> Result<(), GridError> {
        let err = self.out_of_bounds(cell);
        let slot = self.cell_mut(cell).ok_or(err)?;
        if !slot.kind.is_passable() {
            return Err(GridError::ObstacleCell(cell));
        }
        match slot.owner {
            Some(owner) if owner != robot => Err(GridError::CellOccupied {
                cell,
                owner,
                requester: robot,
            }),
            _ => {
                slot.owner = Some(robot);
                slot.occupied = true;
                Ok(())
            }
        }
    }

    /// Release a cell held by `robot`. Returns `false` (and changes nothing)
    /// if the robot does not own it.
    pub fn release(&mut self, cell: GridCell, robot: RobotId) -> bool {
        let Some(slot) = self.cell_mut(cell) else {
            return false;
        };
        if slot.owner != Some(robot) {
            tracing::warn!(%cell, %robot, owner = ?slot.owner, "release by non-owner ignored");
            return false;
        }
        slot.owner = None;
        slot.occupied = false;
        true
    }

    /// Iterate over every cell with its coordinate, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, &Cell)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                let at = GridCell::new(x, y);
                self.cell(at).map(|c| (at, c))
            })
        })
    }

    /// All cells of a given kind, row by row.
    pub fn cells_of_kind(&self, kind: CellKind) -> Vec<GridCell> {
        self.iter()
            .filter(|(_, c)| c.kind == kind)
            .map(|(at, _)| at)
            .collect()
    }

    /// All cells a robot could ever stand on, row by row.
    pub fn passable_cells(&self) -> Vec<GridCell> {
        self.iter()
            .filter(|(_, c)| c.kind.is_passable())
            .map(|(at, _)| at)
            .collect()
    }

    /// Every held cell with its owner.
    pub fn owned_cells(&self) -> Vec<(GridCell, RobotId)> {
        self.iter()
            .filter_map(|(at, c)| c.owner.map(|owner| (at, owner)))
            .collect()
    }
}
