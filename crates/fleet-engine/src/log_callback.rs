//! Tick callback that reports fleet progress through `tracing`.
//!
//! Collision events are logged at debug level as they happen. Every
//! `report_every` ticks a one-line fleet summary is logged at info level.

use fleet_core::Simulation;
use fleet_core::runner::TickCallback;
use fleet_types::TickMetrics;
use tracing::{debug, info};

/// Ticks between summaries at the 50 ms reference cadence (ten seconds).
pub const DEFAULT_REPORT_EVERY: u64 = 200;

/// Callback that logs collision events and periodic fleet summaries.
pub struct LogCallback {
    report_every: u64,
    summaries: u64,
}

impl LogCallback {
    /// Create a callback that summarizes every `report_every` ticks. Zero
    /// disables summaries.
    pub const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            summaries: 0,
        }
    }

    /// Summaries emitted so far.
    pub const fn summaries(&self) -> u64 {
        self.summaries
    }

    const fn is_report_tick(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.report_every), Some(0))
    }
}

impl TickCallback for LogCallback {
    fn on_tick(&mut self, metrics: &TickMetrics, simulation: &Simulation) {
        for event in &metrics.events {
            debug!(
                tick = metrics.tick,
                kind = ?event.kind,
                distance = event.distance,
                description = %event.description,
                "collision event"
            );
        }

        if !self.is_report_tick(metrics.tick) {
            return;
        }
        self.summaries = self.summaries.saturating_add(1);

        let robots = simulation.robot_states();
        let moving = robots.iter().filter(|r| r.is_travelling()).count();
        let pending = simulation
            .tasks()
            .iter()
            .filter(|t| t.assigned_robot.is_none())
            .count();
        let stats = simulation.stats();
        let learning = simulation.learning_metrics();
        info!(
            tick = metrics.tick,
            elapsed_ms = metrics.elapsed_ms,
            robots = robots.len(),
            moving,
            pending,
            tasks_completed = stats.tasks_completed,
            collisions_avoided = stats.collisions_avoided,
            average_congestion = learning.average_congestion,
            congested_zones = learning.congested_zones,
            learning_rate = learning.learning_rate,
            efficiency_gain = learning.efficiency_gain,
            "fleet status"
        );
    }
}
