//! Greedy nearest-robot task assignment.
//!
//! Pending tasks are served in ascending task id (submission order); there
//! is no priority sort. Each task goes to the nearest `Idle` robot by
//! straight-line distance, lowest robot id on ties. A matched robot turns
//! `Moving` at once, so it cannot be matched twice in one pass. If no route
//! exists the task stays `Pending` for the next tick.

use fleet_grid::{WarehouseGrid, find_path};
use fleet_types::{RobotId, RobotStatus, TaskId, TaskStatus};

use crate::fleet::Fleet;

/// A task matched to a robot this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The task.
    pub task: TaskId,
    /// The robot now carrying it.
    pub robot: RobotId,
    /// Number of cells in the planned path, start included.
    pub path_len: usize,
}

/// Summary of one assignment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Successful matches in the order made.
    pub assignments: Vec<Assignment>,
    /// Successful path computations.
    pub paths_calculated: u32,
    /// Tasks whose nearest robot had no route this pass.
    pub unroutable: Vec<TaskId>,
}

/// Nearest robot that accepts tasks, lowest id on ties.
fn nearest_idle(fleet: &Fleet, task: TaskId) -> Option<RobotId> {
    let target = fleet.task(task)?.position.to_position();
    let mut best: Option<(RobotId, f64)> = None;
    for robot in fleet.robots().iter().filter(|r| r.status.accepts_tasks()) {
        let distance = robot.position.distance_to(&target);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((robot.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Match pending tasks to idle robots and hand them their paths.
pub fn assign_pending(fleet: &mut Fleet, grid: &WarehouseGrid) -> AssignmentReport {
    let mut report = AssignmentReport::default();

    for task_id in fleet.pending_task_ids() {
        let Some(robot_id) = nearest_idle(fleet, task_id) else {
            break;
        };
        let (Some(robot), Some(task)) = (fleet.robot(robot_id), fleet.task(task_id)) else {
            continue;
        };
        let goal = task.position;
        let path = find_path(grid, robot.cell, goal, Some(robot_id));
        if path.is_empty() {
            tracing::debug!(task = %task_id, robot = %robot_id, %goal, "no route, task stays pending");
            report.unroutable.push(task_id);
            continue;
        }
        report.paths_calculated = report.paths_calculated.saturating_add(1);
        let path_len = path.len();

        if let Some(robot) = fleet.robot_mut(robot_id) {
            robot.status = RobotStatus::Moving;
            robot.path = path.into();
            robot.target_position = Some(goal);
            robot.current_task = Some(task_id);
            robot.blocked_ticks = 0;
        }
        if let Some(task) = fleet.task_mut(task_id) {
            task.status = TaskStatus::Assigned;
            task.assigned_robot = Some(robot_id);
        }
        tracing::info!(task = %task_id, robot = %robot_id, %goal, path_len, "task assigned");
        report.assignments.push(Assignment {
            task: task_id,
            robot: robot_id,
            path_len,
        });
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_grid::{LayoutKind, build_grid};
    use fleet_types::{GridCell, TaskPriority, TaskRequest, TaskType};

    use super::*;

    fn request(x: u32, y: u32, priority: TaskPriority) -> TaskRequest {
        TaskRequest {
            task_type: TaskType::Delivery,
            position: GridCell::new(x, y),
            priority,
        }
    }

    fn setup(cells: &[GridCell]) -> (Fleet, WarehouseGrid) {
        let mut grid = build_grid(18, 14, LayoutKind::Default).unwrap();
        let fleet = Fleet::new(cells, 100.0, 1.0, &mut grid).unwrap();
        (fleet, grid)
    }

    #[test]
    fn nearest_idle_robot_wins() {
        let (mut fleet, grid) = setup(&[GridCell::new(2, 2), GridCell::new(15, 2)]);
        let task = fleet.submit(request(14, 2, TaskPriority::Medium), 0);
        let report = assign_pending(&mut fleet, &grid);
        assert_eq!(report.assignments.len(), 1);
        assert_eq!(report.paths_calculated, 1);
        let robot = fleet.robot(RobotId::new(1)).unwrap();
        assert_eq!(robot.status, RobotStatus::Moving);
        assert_eq!(robot.current_task, Some(task));
        assert_eq!(robot.target_position, Some(GridCell::new(14, 2)));
        assert_eq!(robot.path.front(), Some(&GridCell::new(15, 2)));
        let task = fleet.task(task).unwrap();
        assert_eq!(task.status, TaskStatus::Assigned);
        assert_eq!(task.assigned_robot, Some(RobotId::new(1)));
    }

    #[test]
    fn equal_distance_goes_to_lowest_id() {
        let (mut fleet, grid) = setup(&[GridCell::new(0, 2), GridCell::new(4, 2)]);
        let _ = fleet.submit(request(2, 2, TaskPriority::Low), 0);
        let report = assign_pending(&mut fleet, &grid);
        assert_eq!(report.assignments.first().map(|a| a.robot), Some(RobotId::new(0)));
    }

    #[test]
    fn robot_never_double_assigned_in_one_pass() {
        let (mut fleet, grid) = setup(&[GridCell::new(2, 2)]);
        let first = fleet.submit(request(3, 2, TaskPriority::Low), 0);
        let second = fleet.submit(request(2, 1, TaskPriority::Critical), 0);
        let report = assign_pending(&mut fleet, &grid);
        assert_eq!(report.assignments.len(), 1);
        // Submission order, not priority, decides who is served.
        assert_eq!(fleet.task(first).unwrap().status, TaskStatus::Assigned);
        assert_eq!(fleet.task(second).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn unroutable_task_stays_pending() {
        let (mut fleet, grid) = setup(&[GridCell::new(2, 2)]);
        // Obstacle cell in the first shelving block.
        let blocked = fleet.submit(request(5, 3, TaskPriority::High), 0);
        let open = fleet.submit(request(3, 3, TaskPriority::High), 0);
        let report = assign_pending(&mut fleet, &grid);
        assert_eq!(report.unroutable, vec![blocked]);
        assert_eq!(fleet.task(blocked).unwrap().status, TaskStatus::Pending);
        // The robot is still free for the next task in the same pass.
        assert_eq!(fleet.task(open).unwrap().status, TaskStatus::Assigned);
    }

    #[test]
    fn charging_and_faulted_robots_are_skipped() {
        let (mut fleet, grid) = setup(&[GridCell::new(2, 2), GridCell::new(15, 2)]);
        fleet.robot_mut(RobotId::new(0)).unwrap().status = RobotStatus::Charging;
        fleet.robot_mut(RobotId::new(1)).unwrap().status = RobotStatus::Error;
        let task = fleet.submit(request(3, 2, TaskPriority::Critical), 0);
        let report = assign_pending(&mut fleet, &grid);
        assert!(report.assignments.is_empty());
        assert_eq!(fleet.task(task).unwrap().status, TaskStatus::Pending);
    }
}
