//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`Simulation::step`] at the configured tick
//! cadence. Before each tick a [`TaskSource`] may submit new work; after
//! each tick a [`TickCallback`] observes the metrics. The loop stops after
//! `simulation.max_ticks` ticks, or runs until the task is dropped when that
//! limit is 0.

use fleet_grid::WarehouseGrid;
use fleet_types::{TaskRequest, TickMetrics};
use tracing::{info, warn};

use crate::simulation::{Simulation, SimulationError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Supplier of new tasks, polled once before every tick.
pub trait TaskSource: Send {
    /// Tasks to submit before tick `tick` runs.
    fn tasks_for_tick(&mut self, tick: u64, grid: &WarehouseGrid) -> Vec<TaskRequest>;
}

/// A task source that never produces work.
pub struct NoTasks;

impl TaskSource for NoTasks {
    fn tasks_for_tick(&mut self, _tick: u64, _grid: &WarehouseGrid) -> Vec<TaskRequest> {
        Vec::new()
    }
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, metrics: &TickMetrics, simulation: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _metrics: &TickMetrics, _simulation: &Simulation) {}
}

/// Result of the simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// The last tick's metrics, if any tick completed.
    pub final_metrics: Option<TickMetrics>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Tasks submitted by the source during the run.
    pub tasks_submitted: u64,
}

/// Run the tick loop until `simulation.max_ticks` is reached.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails.
pub async fn run_simulation(
    simulation: &mut Simulation,
    source: &mut dyn TaskSource,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let max_ticks = simulation.config().simulation.max_ticks;
    let interval_ms = simulation.config().world.tick_interval_ms;
    let mut total_ticks: u64 = 0;
    let mut tasks_submitted: u64 = 0;
    let mut final_metrics = None;

    info!(
        name = %simulation.config().world.name,
        max_ticks,
        tick_interval_ms = interval_ms,
        "Simulation starting"
    );

    loop {
        let upcoming = simulation.tick_count().saturating_add(1);
        for request in source.tasks_for_tick(upcoming, simulation.grid()) {
            let id = simulation.submit_task(request);
            tasks_submitted = tasks_submitted.saturating_add(1);
            tracing::debug!(task = %id, tick = upcoming, "generated task");
        }

        let metrics = simulation.step()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&metrics, simulation);

        let done = max_ticks > 0 && metrics.tick >= max_ticks;
        if done {
            info!(tick = metrics.tick, max_ticks, "Tick limit reached");
        }
        final_metrics = Some(metrics);
        if done {
            break;
        }

        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }

    Ok(SimulationResult {
        final_metrics,
        total_ticks,
        tasks_submitted,
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult, simulation: &Simulation) {
    let stats = simulation.stats();
    let learning = simulation.learning_metrics();
    info!(
        total_ticks = result.total_ticks,
        tasks_submitted = result.tasks_submitted,
        tasks_completed = stats.tasks_completed,
        tasks_abandoned = stats.tasks_abandoned,
        total_distance = stats.total_distance,
        collisions_avoided = stats.collisions_avoided,
        near_misses = stats.near_misses,
        critical_avoidances = stats.critical_avoidances,
        learning_rate = learning.learning_rate,
        efficiency_gain = learning.efficiency_gain,
        "Simulation ended"
    );
    if result.final_metrics.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_types::{GridCell, TaskPriority, TaskType};

    use super::*;
    use crate::config::SimulationConfig;

    fn bounded(max_ticks: u64) -> Simulation {
        let mut config = SimulationConfig::default();
        config.simulation.max_ticks = max_ticks;
        config.world.tick_interval_ms = 0;
        Simulation::new(config).unwrap()
    }

    /// Submits one task on the first tick only.
    struct OneShot(bool);

    impl TaskSource for OneShot {
        fn tasks_for_tick(&mut self, _tick: u64, _grid: &WarehouseGrid) -> Vec<TaskRequest> {
            if self.0 {
                return Vec::new();
            }
            self.0 = true;
            vec![TaskRequest {
                task_type: TaskType::Pickup,
                position: GridCell::new(0, 6),
                priority: TaskPriority::Medium,
            }]
        }
    }

    struct Counter(u64);

    impl TickCallback for Counter {
        fn on_tick(&mut self, _metrics: &TickMetrics, _simulation: &Simulation) {
            self.0 = self.0.saturating_add(1);
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let mut sim = bounded(5);
        let mut counter = Counter(0);
        let result = run_simulation(&mut sim, &mut NoTasks, &mut counter)
            .await
            .unwrap();
        assert_eq!(result.total_ticks, 5);
        assert_eq!(counter.0, 5);
        assert_eq!(result.final_metrics.as_ref().map(|m| m.tick), Some(5));
        log_simulation_end(&result, &sim);
    }

    #[tokio::test]
    async fn source_tasks_are_submitted_and_served() {
        let mut sim = bounded(40);
        let result = run_simulation(&mut sim, &mut OneShot(false), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.tasks_submitted, 1);
        assert_eq!(sim.stats().tasks_completed, 1);
    }
}
