//! A* search over the warehouse grid.
//!
//! Four-connected moves with uniform step cost 1 and a Manhattan-distance
//! heuristic. The open set is a `BTreeSet` keyed on `(f, sequence, cell)`,
//! which expands the lowest `f = g + h` first and, among equal `f`, the node
//! that first entered the open set earliest. Results are
//! therefore fully deterministic for a given grid snapshot.
//!
//! Failure is a value: an unreachable or blocked goal yields an empty path.
//! A partial path is never returned.

use std::collections::{BTreeMap, BTreeSet};

use fleet_types::{GridCell, RobotId};

use crate::grid::WarehouseGrid;

/// Open-set entry: `(f, insertion sequence, cell)`.
type OpenKey = (u32, u64, GridCell);

/// Frontier ordered by `f`, then by the order cells first entered it.
///
/// Lowering a queued cell's `f` keeps its original sequence number, so it
/// holds its place among equal-`f` peers.
#[derive(Debug, Default)]
struct OpenSet {
    queue: BTreeSet<OpenKey>,
    keys: BTreeMap<GridCell, (u32, u64)>,
    next_sequence: u64,
}

impl OpenSet {
    /// Queue `cell` at `f`, or re-key it in place if already queued.
    fn push(&mut self, cell: GridCell, f: u32) {
        let sequence = match self.keys.get(&cell).copied() {
            Some((old_f, sequence)) => {
                self.queue.remove(&(old_f, sequence, cell));
                sequence
            }
            None => {
                let sequence = self.next_sequence;
                self.next_sequence = sequence.saturating_add(1);
                sequence
            }
        };
        self.queue.insert((f, sequence, cell));
        self.keys.insert(cell, (f, sequence));
    }

    /// Remove and return the cell with the lowest `(f, sequence)`.
    fn pop(&mut self) -> Option<GridCell> {
        let (_, _, cell) = self.queue.pop_first()?;
        self.keys.remove(&cell);
        Some(cell)
    }
}

/// Find a route from `start` to `goal`, inclusive of both ends.
///
/// Cells owned by any robot other than `exclude` are treated as blocked, as
/// are obstacles and out-of-bounds cells. The start cell itself is never
/// checked for traversability (the caller is standing on it).
///
/// Returns:
/// - `[start]` when `start == goal`;
/// - an empty path when the goal is blocked or unreachable;
/// - otherwise the full ordered path.
pub fn find_path(
    grid: &WarehouseGrid,
    start: GridCell,
    goal: GridCell,
    exclude: Option<RobotId>,
) -> Vec<GridCell> {
    if start == goal {
        return vec![start];
    }
    if !grid.contains(start) || !grid.is_traversable(goal, exclude) {
        tracing::trace!(%start, %goal, "goal blocked or start outside grid");
        return Vec::new();
    }

    let mut open = OpenSet::default();
    let mut g_score: BTreeMap<GridCell, u32> = BTreeMap::new();
    let mut came_from: BTreeMap<GridCell, GridCell> = BTreeMap::new();
    let mut closed: BTreeSet<GridCell> = BTreeSet::new();

    open.push(start, start.manhattan_to(goal));
    g_score.insert(start, 0);

    while let Some(current) = open.pop() {
        if current == goal {
            let path = reconstruct(&came_from, start, goal);
            tracing::trace!(%start, %goal, len = path.len(), expanded = closed.len(), "path found");
            return path;
        }
        closed.insert(current);

        let current_g = g_score.get(&current).copied().unwrap_or(0);
        let tentative_g = current_g.saturating_add(1);

        for next in grid.neighbors(current) {
            if closed.contains(&next) || !grid.is_traversable(next, exclude) {
                continue;
            }
            let known_g = g_score.get(&next).copied().unwrap_or(u32::MAX);
            if tentative_g >= known_g {
                continue;
            }
            open.push(next, tentative_g.saturating_add(next.manhattan_to(goal)));
            g_score.insert(next, tentative_g);
            came_from.insert(next, current);
        }
    }

    tracing::trace!(%start, %goal, expanded = closed.len(), "no path");
    Vec::new()
}

/// Walk predecessor links back from `goal` to `start`.
fn reconstruct(
    came_from: &BTreeMap<GridCell, GridCell>,
    start: GridCell,
    goal: GridCell,
) -> Vec<GridCell> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(&previous) = came_from.get(&current) else {
            return Vec::new();
        };
        path.push(previous);
        current = previous;
        // Each step strictly lowers g, so the walk cannot exceed the map size.
        if path.len() > came_from.len().saturating_add(1) {
            return Vec::new();
        }
    }
    path.reverse();
    path
}

/// Check that a path is a chain of edge-adjacent, passable, in-bounds cells.
///
/// Occupancy is not considered; this validates geometry only.
pub fn is_valid_path(grid: &WarehouseGrid, path: &[GridCell]) -> bool {
    let cells_ok = path
        .iter()
        .all(|&cell| grid.kind(cell).is_some_and(fleet_types::CellKind::is_passable));
    let steps_ok = path.windows(2).all(|pair| match pair {
        [a, b] => a.is_adjacent(*b),
        _ => false,
    });
    cells_ok && steps_ok
}
