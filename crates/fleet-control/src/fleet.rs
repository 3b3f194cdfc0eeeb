//! The robot and task arenas.
//!
//! Robots live in a `Vec` indexed by [`RobotId`]; tasks live in a
//! `BTreeMap` keyed by [`TaskId`], so iteration is always in submission
//! order. Every tick phase goes through these lookups instead of holding
//! references across phases.

use std::collections::BTreeMap;

use fleet_grid::WarehouseGrid;
use fleet_types::{
    GridCell, Robot, RobotId, RobotStatus, Task, TaskId, TaskPriority, TaskRequest, TaskStatus,
};

use crate::error::ControlError;

/// Fleet state: the fixed set of robots plus every active task.
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    robots: Vec<Robot>,
    tasks: BTreeMap<TaskId, Task>,
    next_task_id: TaskId,
}

impl Fleet {
    /// Place one idle robot on each start cell and claim those cells.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Grid`] if a start cell is outside the grid,
    /// an obstacle, or already taken by an earlier robot, and
    /// [`ControlError::FleetTooLarge`] if the fleet cannot be addressed by
    /// robot ids.
    pub fn new(
        start_cells: &[GridCell],
        battery: f64,
        speed: f64,
        grid: &mut WarehouseGrid,
    ) -> Result<Self, ControlError> {
        let mut robots = Vec::with_capacity(start_cells.len());
        for (index, &cell) in start_cells.iter().enumerate() {
            let raw =
                u32::try_from(index).map_err(|_err| ControlError::FleetTooLarge(start_cells.len()))?;
            let id = RobotId::new(raw);
            grid.claim(cell, id)?;
            robots.push(Robot::new(id, cell, battery, speed));
        }
        tracing::debug!(robots = robots.len(), "fleet placed");
        Ok(Self {
            robots,
            tasks: BTreeMap::new(),
            next_task_id: TaskId::new(0),
        })
    }

    /// All robots in id order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Mutable access to all robots in id order.
    pub fn robots_mut(&mut self) -> &mut [Robot] {
        &mut self.robots
    }

    /// Look up a robot.
    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id.index())
    }

    /// Look up a robot mutably.
    pub fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(id.index())
    }

    /// Active tasks in submission order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values()
    }

    /// Look up a task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Look up a task mutably.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    /// Enqueue a new pending task stamped with simulated time `now_ms`.
    pub fn submit(&mut self, request: TaskRequest, now_ms: u64) -> TaskId {
        let id = self.next_task_id;
        self.next_task_id = id.next();
        self.tasks.insert(id, Task::from_request(id, request, now_ms));
        tracing::debug!(
            task = %id,
            target = %request.position,
            priority = ?request.priority,
            "task submitted"
        );
        id
    }

    /// Pending tasks, ascending by id.
    pub fn pending_task_ids(&self) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| t.id)
            .collect()
    }

    /// Move every `Assigned` task to `InProgress`. Returns how many moved.
    pub fn promote_assigned(&mut self) -> usize {
        let mut promoted: usize = 0;
        for task in self.tasks.values_mut() {
            if task.status == TaskStatus::Assigned {
                task.status = TaskStatus::InProgress;
                promoted = promoted.saturating_add(1);
            }
        }
        promoted
    }

    /// Mark a task completed at `now_ms`. Returns `false` for unknown ids.
    pub fn complete_task(&mut self, id: TaskId, now_ms: u64) -> bool {
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        task.status = TaskStatus::Completed;
        task.completed_at_ms = Some(now_ms);
        true
    }

    /// Return a task to the pending pool. Returns `false` for unknown ids.
    pub fn requeue_task(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        task.requeue();
        true
    }

    /// Drop completed tasks whose retention window has passed.
    pub fn purge_completed(&mut self, now_ms: u64, retention_ms: u64) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| match (task.status, task.completed_at_ms) {
            (TaskStatus::Completed, Some(done)) => now_ms.saturating_sub(done) < retention_ms,
            _ => true,
        });
        before.saturating_sub(self.tasks.len())
    }

    /// Priority of the task a robot is executing.
    pub fn task_priority(&self, robot: &Robot) -> Option<TaskPriority> {
        robot
            .current_task
            .and_then(|id| self.tasks.get(&id))
            .map(|t| t.priority)
    }

    /// Right-of-way rank: the task priority ordinal, or 0 without a task.
    pub fn priority_rank(&self, robot: &Robot) -> u8 {
        self.task_priority(robot).map_or(0, TaskPriority::rank)
    }

    /// Ranks for every robot, in id order.
    pub fn priority_ranks(&self) -> Vec<u8> {
        self.robots.iter().map(|r| self.priority_rank(r)).collect()
    }

    /// Take a robot off its assignment and put it in `status`.
    ///
    /// The robot keeps its grid cell. Its task, if any, goes back to
    /// `Pending` so another robot can pick it up.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::RobotNotFound`] for an unknown id.
    pub fn release_robot(
        &mut self,
        id: RobotId,
        status: RobotStatus,
    ) -> Result<Option<TaskId>, ControlError> {
        let robot = self
            .robots
            .get_mut(id.index())
            .ok_or(ControlError::RobotNotFound(id))?;
        let task = robot.current_task;
        robot.clear_assignment();
        robot.status = status;
        if let Some(task_id) = task {
            self.requeue_task(task_id);
        }
        Ok(task)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_grid::{LayoutKind, build_grid};
    use fleet_types::TaskType;

    use super::*;

    fn request(x: u32, y: u32, priority: TaskPriority) -> TaskRequest {
        TaskRequest {
            task_type: TaskType::Pickup,
            position: GridCell::new(x, y),
            priority,
        }
    }

    fn fleet_on_open_floor(cells: &[GridCell]) -> (Fleet, WarehouseGrid) {
        let mut grid = build_grid(6, 6, LayoutKind::Open).unwrap();
        let fleet = Fleet::new(cells, 100.0, 1.0, &mut grid).unwrap();
        (fleet, grid)
    }

    #[test]
    fn robots_claim_their_start_cells() {
        let cells = [GridCell::new(0, 0), GridCell::new(3, 2)];
        let (fleet, grid) = fleet_on_open_floor(&cells);
        assert_eq!(fleet.robots().len(), 2);
        assert_eq!(grid.owner(GridCell::new(3, 2)), Some(RobotId::new(1)));
        assert_eq!(fleet.robot(RobotId::new(1)).map(|r| r.cell), Some(GridCell::new(3, 2)));
    }

    #[test]
    fn duplicate_start_cells_rejected() {
        let mut grid = build_grid(4, 4, LayoutKind::Open).unwrap();
        let cells = [GridCell::new(1, 1), GridCell::new(1, 1)];
        assert!(matches!(
            Fleet::new(&cells, 100.0, 1.0, &mut grid),
            Err(ControlError::Grid { .. })
        ));
    }

    #[test]
    fn task_ids_follow_submission_order() {
        let (mut fleet, _grid) = fleet_on_open_floor(&[GridCell::new(0, 0)]);
        let a = fleet.submit(request(1, 1, TaskPriority::Low), 0);
        let b = fleet.submit(request(2, 2, TaskPriority::Critical), 50);
        assert!(a < b);
        assert_eq!(fleet.pending_task_ids(), vec![a, b]);
        assert_eq!(fleet.task(b).map(|t| t.created_at_ms), Some(50));
    }

    #[test]
    fn lifecycle_promote_complete_purge() {
        let (mut fleet, _grid) = fleet_on_open_floor(&[GridCell::new(0, 0)]);
        let id = fleet.submit(request(1, 1, TaskPriority::High), 0);
        fleet.task_mut(id).unwrap().status = TaskStatus::Assigned;
        assert_eq!(fleet.promote_assigned(), 1);
        assert_eq!(fleet.task(id).unwrap().status, TaskStatus::InProgress);

        assert!(fleet.complete_task(id, 1_000));
        assert_eq!(fleet.purge_completed(3_999, 3_000), 0);
        assert_eq!(fleet.purge_completed(4_000, 3_000), 1);
        assert!(fleet.task(id).is_none());
    }

    #[test]
    fn rank_is_zero_without_task() {
        let (mut fleet, _grid) = fleet_on_open_floor(&[GridCell::new(0, 0), GridCell::new(1, 0)]);
        let id = fleet.submit(request(4, 4, TaskPriority::Critical), 0);
        fleet.robot_mut(RobotId::new(1)).unwrap().current_task = Some(id);
        assert_eq!(fleet.priority_ranks(), vec![0, 4]);
    }

    #[test]
    fn release_requeues_task() {
        let (mut fleet, _grid) = fleet_on_open_floor(&[GridCell::new(0, 0)]);
        let id = fleet.submit(request(4, 4, TaskPriority::Medium), 0);
        {
            let robot = fleet.robot_mut(RobotId::new(0)).unwrap();
            robot.status = RobotStatus::Moving;
            robot.current_task = Some(id);
            robot.path.push_back(GridCell::new(1, 0));
        }
        {
            let task = fleet.task_mut(id).unwrap();
            task.status = TaskStatus::InProgress;
            task.assigned_robot = Some(RobotId::new(0));
        }

        let released = fleet.release_robot(RobotId::new(0), RobotStatus::Charging);
        assert_eq!(released.ok().flatten(), Some(id));
        let robot = fleet.robot(RobotId::new(0)).unwrap();
        assert_eq!(robot.status, RobotStatus::Charging);
        assert!(robot.path.is_empty());
        assert_eq!(fleet.task(id).unwrap().status, TaskStatus::Pending);
        assert!(fleet.release_robot(RobotId::new(7), RobotStatus::Error).is_err());
    }
}
