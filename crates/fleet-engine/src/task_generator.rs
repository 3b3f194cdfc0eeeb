//! Seeded random task generator.
//!
//! Each tick, with probability `spawn_probability`, one task is produced at
//! a uniformly chosen non-obstacle cell with a uniformly chosen type and
//! priority. The generator owns its RNG, so a given seed always produces
//! the same task stream.

use fleet_core::runner::TaskSource;
use fleet_grid::WarehouseGrid;
use fleet_types::{TaskPriority, TaskRequest, TaskType};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const TASK_TYPES: [TaskType; 3] = [TaskType::Pickup, TaskType::Delivery, TaskType::Scan];

const PRIORITIES: [TaskPriority; 4] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High,
    TaskPriority::Critical,
];

/// Task source that spawns random work at a fixed per-tick probability.
pub struct RandomTaskSource {
    rng: SmallRng,
    spawn_probability: f64,
}

impl RandomTaskSource {
    /// Create a generator. The probability is clamped into `[0, 1]`; a NaN
    /// probability disables spawning.
    pub fn new(seed: u64, spawn_probability: f64) -> Self {
        let spawn_probability = if spawn_probability.is_nan() {
            0.0
        } else {
            spawn_probability.clamp(0.0, 1.0)
        };
        Self {
            rng: SmallRng::seed_from_u64(seed),
            spawn_probability,
        }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..items.len());
        items.get(index).copied()
    }
}

impl TaskSource for RandomTaskSource {
    fn tasks_for_tick(&mut self, _tick: u64, grid: &WarehouseGrid) -> Vec<TaskRequest> {
        if !self.rng.random_bool(self.spawn_probability) {
            return Vec::new();
        }
        let cells = grid.passable_cells();
        let (Some(position), Some(task_type), Some(priority)) = (
            self.pick(&cells),
            self.pick(&TASK_TYPES),
            self.pick(&PRIORITIES),
        ) else {
            return Vec::new();
        };
        vec![TaskRequest {
            task_type,
            position,
            priority,
        }]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_grid::{LayoutKind, build_grid};

    use super::*;

    fn grid() -> WarehouseGrid {
        build_grid(18, 14, LayoutKind::Default).unwrap()
    }

    fn stream(seed: u64, ticks: u64) -> Vec<TaskRequest> {
        let grid = grid();
        let mut source = RandomTaskSource::new(seed, 0.5);
        (1..=ticks)
            .flat_map(|tick| source.tasks_for_tick(tick, &grid))
            .collect()
    }

    #[test]
    fn same_seed_same_tasks() {
        assert_eq!(stream(42, 200), stream(42, 200));
        assert_ne!(stream(42, 200), stream(43, 200));
    }

    #[test]
    fn targets_are_never_obstacles() {
        let grid = grid();
        let mut source = RandomTaskSource::new(7, 1.0);
        for tick in 1..=500 {
            let tasks = source.tasks_for_tick(tick, &grid);
            assert_eq!(tasks.len(), 1);
            for task in tasks {
                assert!(grid.kind(task.position).is_some_and(fleet_types::CellKind::is_passable));
            }
        }
    }

    #[test]
    fn zero_probability_spawns_nothing() {
        let grid = grid();
        let mut source = RandomTaskSource::new(7, 0.0);
        assert!((1..=500).all(|tick| source.tasks_for_tick(tick, &grid).is_empty()));

        let mut nan = RandomTaskSource::new(7, f64::NAN);
        assert!(nan.tasks_for_tick(1, &grid).is_empty());
    }

    #[test]
    fn every_priority_eventually_appears() {
        let tasks = stream(3, 400);
        for priority in PRIORITIES {
            assert!(tasks.iter().any(|t| t.priority == priority));
        }
        for kind in TASK_TYPES {
            assert!(tasks.iter().any(|t| t.task_type == kind));
        }
    }
}
