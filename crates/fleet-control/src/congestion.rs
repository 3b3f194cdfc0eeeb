//! Zone-based congestion learning and adaptive speed.
//!
//! The grid is tiled into square zones. Every tick [`CongestionLearner::analyze`]
//! recounts moving robots near each zone centre, appends the level to a
//! bounded history, and derives a recommended zone speed from a blend of
//! history and the current reading. Robots are then nudged toward an adaptive
//! target speed at the current learning rate.
//!
//! The learning rate and counters live in [`LearningState`], a plain value
//! advanced by [`LearningState::step`], so the boost and decay rules can be
//! tested without a fleet.

use fleet_types::{
    CongestionZone, GridCell, LearningMetrics, Position, Robot, RobotStatus, TaskPriority, ZoneId,
};

use crate::config::CongestionConfig;
use crate::error::ControlError;

/// Lower bound of the learning rate.
pub const MIN_LEARNING_RATE: f64 = 0.05;
/// Upper bound of the learning rate.
pub const MAX_LEARNING_RATE: f64 = 0.3;
/// Zones above this level are hot: look-ahead caps and metrics count them.
pub const HOT_ZONE_THRESHOLD: f64 = 0.6;
/// Zones above this level are congested for counters and low-priority caps.
pub const CONGESTED_THRESHOLD: f64 = 0.5;
/// Speed changes larger than this count as an adjustment.
pub const ADJUSTMENT_THRESHOLD: f64 = 0.05;
/// Moving robots near a zone centre that saturate its level.
pub const ROBOTS_FOR_FULL_CONGESTION: f64 = 3.0;
/// Weight of the historical average in the zone speed blend.
pub const HISTORY_WEIGHT: f64 = 0.7;
/// Target speed cap when a hot zone lies ahead, or for low-priority work in
/// a congested zone.
pub const CONGESTED_SPEED_CAP: f64 = 0.5;
/// Multiplier applied to critical-priority targets.
pub const CRITICAL_BOOST: f64 = 1.2;
/// Zone speed multiplier applied per recorded collision.
pub const COLLISION_SPEED_DECAY: f64 = 0.85;
/// Zone speed floor after collision decay.
pub const COLLISION_SPEED_FLOOR: f64 = 0.3;
/// Learning-rate growth factor.
pub const RATE_BOOST: f64 = 1.1;
/// Learning-rate decay factor.
pub const RATE_DECAY: f64 = 0.95;
/// Success ratios above this slow the learner down.
pub const HIGH_SUCCESS_RATIO: f64 = 0.9;
/// Success ratios below this speed the learner up.
pub const LOW_SUCCESS_RATIO: f64 = 0.7;
/// Lowest speed a robot can be smoothed to.
pub const MIN_ROBOT_SPEED: f64 = 0.2;
/// Highest speed a robot can be smoothed to.
pub const MAX_ROBOT_SPEED: f64 = 1.2;

/// Map a blended congestion reading to a recommended zone speed.
pub const fn speed_band(blended: f64) -> f64 {
    if blended > 0.7 {
        0.4
    } else if blended > 0.5 {
        0.6
    } else if blended > 0.3 {
        0.8
    } else {
        1.0
    }
}

/// An input to the learning state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LearningSignal {
    /// A collision (or near-collision) was recorded somewhere.
    CollisionRecorded,
    /// A task finished; `success_ratio` is completions over attempts.
    TaskOutcome {
        /// `completed / (completed + collisions_avoided + 1)`.
        success_ratio: f64,
    },
    /// A robot's speed moved by more than [`ADJUSTMENT_THRESHOLD`].
    SpeedAdjusted,
    /// A robot spent a tick in a congested zone.
    CongestionObserved,
    /// Latch the efficiency baseline if none is set.
    BaselineCaptured {
        /// Average zone congestion at capture time.
        average_congestion: f64,
    },
}

/// Global learner state: learning rate, counters, and efficiency baseline.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LearningState {
    /// Speed smoothing coefficient in `[MIN_LEARNING_RATE, MAX_LEARNING_RATE]`.
    pub learning_rate: f64,
    /// Robot-ticks spent in congested zones.
    pub total_congestion_events: u64,
    /// Speed changes above the adjustment threshold.
    pub speed_adjustments: u64,
    /// Average congestion latched as the efficiency reference.
    pub baseline_congestion: Option<f64>,
}

impl LearningState {
    /// Fresh state with the rate clamped into bounds.
    pub fn new(initial_rate: f64) -> Self {
        Self {
            learning_rate: initial_rate.clamp(MIN_LEARNING_RATE, MAX_LEARNING_RATE),
            total_congestion_events: 0,
            speed_adjustments: 0,
            baseline_congestion: None,
        }
    }

    /// Apply one signal and return the resulting state.
    #[must_use]
    pub fn step(self, signal: LearningSignal) -> Self {
        match signal {
            LearningSignal::CollisionRecorded => Self {
                learning_rate: (self.learning_rate * RATE_BOOST).min(MAX_LEARNING_RATE),
                ..self
            },
            LearningSignal::TaskOutcome { success_ratio } => {
                let learning_rate = if success_ratio > HIGH_SUCCESS_RATIO {
                    (self.learning_rate * RATE_DECAY).max(MIN_LEARNING_RATE)
                } else if success_ratio < LOW_SUCCESS_RATIO {
                    (self.learning_rate * RATE_BOOST).min(MAX_LEARNING_RATE)
                } else {
                    self.learning_rate
                };
                Self {
                    learning_rate,
                    ..self
                }
            }
            LearningSignal::SpeedAdjusted => Self {
                speed_adjustments: self.speed_adjustments.saturating_add(1),
                ..self
            },
            LearningSignal::CongestionObserved => Self {
                total_congestion_events: self.total_congestion_events.saturating_add(1),
                ..self
            },
            LearningSignal::BaselineCaptured { average_congestion } => {
                if self.baseline_congestion.is_some() || average_congestion <= f64::EPSILON {
                    self
                } else {
                    Self {
                        baseline_congestion: Some(average_congestion),
                        ..self
                    }
                }
            }
        }
    }

    /// Percent reduction of `current` congestion against the baseline.
    /// Zero until a baseline is latched.
    pub fn efficiency_gain(&self, current: f64) -> f64 {
        match self.baseline_congestion {
            Some(baseline) if baseline > f64::EPSILON => (baseline - current) / baseline * 100.0,
            _ => 0.0,
        }
    }
}

/// Per-zone congestion tracking plus the global learning state.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionLearner {
    config: CongestionConfig,
    zones: Vec<CongestionZone>,
    columns: u32,
    rows: u32,
    state: LearningState,
}

impl CongestionLearner {
    /// Tile a `width` x `height` grid into zones.
    ///
    /// # Errors
    ///
    /// Rejects a zero zone size, zero history capacity, or an empty grid.
    pub fn new(width: u32, height: u32, config: CongestionConfig) -> Result<Self, ControlError> {
        if config.zone_size == 0 {
            return Err(ControlError::InvalidZoneSize);
        }
        if config.history_capacity == 0 {
            return Err(ControlError::InvalidHistoryCapacity);
        }
        if width == 0 || height == 0 {
            return Err(ControlError::InvalidGridSize { width, height });
        }

        let size = config.zone_size;
        let columns = width.div_ceil(size);
        let rows = height.div_ceil(size);
        let mut zones = Vec::new();
        let mut next_id = ZoneId::new(0);
        for row in 0..rows {
            for column in 0..columns {
                let origin = GridCell::new(column.saturating_mul(size), row.saturating_mul(size));
                zones.push(CongestionZone {
                    id: next_id,
                    origin,
                    width: size.min(width.saturating_sub(origin.x)),
                    height: size.min(height.saturating_sub(origin.y)),
                    robot_count: 0,
                    congestion_level: 0.0,
                    history: std::collections::VecDeque::with_capacity(config.history_capacity),
                    avg_speed: 1.0,
                    collision_count: 0,
                });
                next_id = next_id.next();
            }
        }
        tracing::debug!(zones = zones.len(), columns, rows, zone_size = size, "zones tiled");

        let state = LearningState::new(config.initial_learning_rate);
        Ok(Self {
            config,
            zones,
            columns,
            rows,
            state,
        })
    }

    /// All zones, row-major.
    pub fn zones(&self) -> &[CongestionZone] {
        &self.zones
    }

    /// Current learning state.
    pub const fn state(&self) -> &LearningState {
        &self.state
    }

    /// Current learning rate.
    pub const fn learning_rate(&self) -> f64 {
        self.state.learning_rate
    }

    /// The zone containing a position: `floor(pos / zone_size)` per axis.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zone_id_for(&self, position: &Position) -> Option<ZoneId> {
        let size = f64::from(self.config.zone_size);
        let column = (position.x / size).floor();
        let row = (position.y / size).floor();
        if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
            return None;
        }
        if column >= f64::from(self.columns) || row >= f64::from(self.rows) {
            return None;
        }
        // Both values are non-negative integers below u32 zone counts.
        let index = (row as u32)
            .checked_mul(self.columns)?
            .checked_add(column as u32)?;
        Some(ZoneId::new(index))
    }

    /// The zone containing a position.
    pub fn zone_for(&self, position: &Position) -> Option<&CongestionZone> {
        self.zone_id_for(position)
            .and_then(|id| self.zones.get(id.index()))
    }

    /// Recompute every zone from the current robot positions.
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze(&mut self, robots: &[Robot]) {
        let robot_zones: Vec<Option<ZoneId>> = robots
            .iter()
            .map(|r| self.zone_id_for(&r.position))
            .collect();
        let size = self.config.zone_size;
        let radius = f64::from(size);
        let capacity = self.config.history_capacity;

        for zone in &mut self.zones {
            let count = robot_zones.iter().filter(|z| **z == Some(zone.id)).count();
            zone.robot_count = u32::try_from(count).unwrap_or(u32::MAX);

            let center = zone.center(size);
            let nearby = robots
                .iter()
                .filter(|r| r.status == RobotStatus::Moving)
                .filter(|r| center.distance_to(&r.position) <= radius)
                .count();
            // Fleet sizes are small; the count converts to f64 exactly.
            zone.congestion_level = (nearby as f64 / ROBOTS_FOR_FULL_CONGESTION).min(1.0);

            zone.history.push_back(zone.congestion_level);
            while zone.history.len() > capacity {
                zone.history.pop_front();
            }
            let blended = HISTORY_WEIGHT.mul_add(
                zone.historical_average(),
                (1.0 - HISTORY_WEIGHT) * zone.congestion_level,
            );
            zone.avg_speed = speed_band(blended);
        }

        tracing::trace!(
            hot = self.zones.iter().filter(|z| z.congestion_level > HOT_ZONE_THRESHOLD).count(),
            "congestion analyzed"
        );
    }

    /// Smooth a robot's speed toward its adaptive target and return the new
    /// speed, clamped to `[MIN_ROBOT_SPEED, MAX_ROBOT_SPEED]`.
    ///
    /// `priority` is the priority of the robot's current task, if any.
    #[allow(clippy::cast_precision_loss)]
    pub fn get_adaptive_speed(
        &mut self,
        robot: &Robot,
        priority: Option<TaskPriority>,
        robots: &[Robot],
    ) -> f64 {
        let (zone_speed, zone_level) = self
            .zone_for(&robot.position)
            .map_or((1.0, 0.0), |z| (z.avg_speed, z.congestion_level));
        let mut target = zone_speed;

        let neighbor_speeds: Vec<f64> = robots
            .iter()
            .filter(|other| other.id != robot.id)
            .filter(|other| robot.position.distance_to(&other.position) <= self.config.neighbor_radius)
            .map(|other| other.speed)
            .collect();
        if !neighbor_speeds.is_empty() {
            let mean = neighbor_speeds.iter().sum::<f64>() / neighbor_speeds.len() as f64;
            target = (target + mean) / 2.0;
        }

        let hot_ahead = robot
            .path
            .iter()
            .take(self.config.lookahead_waypoints)
            .filter_map(|cell| self.zone_for(&cell.to_position()))
            .any(|z| z.congestion_level > HOT_ZONE_THRESHOLD);
        if hot_ahead {
            target = target.min(CONGESTED_SPEED_CAP);
        }

        match priority {
            Some(TaskPriority::Critical) => target = (target * CRITICAL_BOOST).min(1.0),
            Some(TaskPriority::Low) if zone_level > CONGESTED_THRESHOLD => {
                target = target.min(CONGESTED_SPEED_CAP);
            }
            _ => {}
        }

        let speed = (target - robot.speed)
            .mul_add(self.state.learning_rate, robot.speed)
            .clamp(MIN_ROBOT_SPEED, MAX_ROBOT_SPEED);

        if (speed - robot.speed).abs() > ADJUSTMENT_THRESHOLD {
            self.state = self.state.step(LearningSignal::SpeedAdjusted);
        }
        if zone_level > CONGESTED_THRESHOLD {
            self.state = self.state.step(LearningSignal::CongestionObserved);
        }
        speed
    }

    /// Register a collision at `position`: slow its zone and make the
    /// learner more reactive.
    pub fn record_collision(&mut self, position: &Position) {
        if let Some(zone) = self
            .zone_id_for(position)
            .and_then(|id| self.zones.get_mut(id.index()))
        {
            zone.avg_speed = (zone.avg_speed * COLLISION_SPEED_DECAY).max(COLLISION_SPEED_FLOOR);
            zone.collision_count = zone.collision_count.saturating_add(1);
            tracing::trace!(zone = %zone.id, avg_speed = zone.avg_speed, "collision recorded");
        }
        self.state = self.state.step(LearningSignal::CollisionRecorded);
    }

    /// Retune the learning rate from a task success ratio.
    pub fn update_learning_rate(&mut self, success_ratio: f64) {
        self.state = self.state.step(LearningSignal::TaskOutcome { success_ratio });
    }

    /// Latch the current average congestion as the efficiency baseline.
    /// Returns `true` once a baseline is set. Zero readings are not latched.
    pub fn capture_baseline(&mut self) -> bool {
        if self.state.baseline_congestion.is_none() {
            let average_congestion = self.average_congestion();
            self.state = self
                .state
                .step(LearningSignal::BaselineCaptured { average_congestion });
            if let Some(baseline) = self.state.baseline_congestion {
                tracing::info!(baseline, "efficiency baseline captured");
            }
        }
        self.state.baseline_congestion.is_some()
    }

    /// Mean congestion level across all zones.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_congestion(&self) -> f64 {
        if self.zones.is_empty() {
            return 0.0;
        }
        self.zones.iter().map(|z| z.congestion_level).sum::<f64>() / self.zones.len() as f64
    }

    /// Telemetry snapshot.
    pub fn get_metrics(&self) -> LearningMetrics {
        let average_congestion = self.average_congestion();
        let congested = self
            .zones
            .iter()
            .filter(|z| z.congestion_level > HOT_ZONE_THRESHOLD)
            .count();
        LearningMetrics {
            average_congestion,
            congested_zones: u32::try_from(congested).unwrap_or(u32::MAX),
            learning_rate: self.state.learning_rate,
            efficiency_gain: self.state.efficiency_gain(average_congestion),
            total_congestion_events: self.state.total_congestion_events,
            speed_adjustments: self.state.speed_adjustments,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::arithmetic_side_effects)]
mod tests {
    use fleet_types::RobotId;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn learner() -> CongestionLearner {
        CongestionLearner::new(18, 14, CongestionConfig::default()).unwrap()
    }

    fn moving_robot(id: u32, x: f64, y: f64) -> Robot {
        let mut robot = Robot::new(RobotId::new(id), GridCell::new(0, 0), 100.0, 1.0);
        robot.position = Position::new(x, y);
        robot.status = RobotStatus::Moving;
        robot
    }

    #[test]
    fn invalid_construction_rejected() {
        let zero_zone = CongestionConfig {
            zone_size: 0,
            ..CongestionConfig::default()
        };
        assert!(matches!(
            CongestionLearner::new(18, 14, zero_zone),
            Err(ControlError::InvalidZoneSize)
        ));
        let zero_history = CongestionConfig {
            history_capacity: 0,
            ..CongestionConfig::default()
        };
        assert!(CongestionLearner::new(18, 14, zero_history).is_err());
        assert!(CongestionLearner::new(0, 14, CongestionConfig::default()).is_err());
    }

    #[test]
    fn zones_tile_the_grid_exactly() {
        let l = CongestionLearner::new(10, 7, CongestionConfig::default()).unwrap();
        // 4 columns (3+3+3+1) by 3 rows (3+3+1).
        assert_eq!(l.zones().len(), 12);
        let area: u32 = l.zones().iter().map(|z| z.width * z.height).sum();
        assert_eq!(area, 70);
        for y in 0..7 {
            for x in 0..10 {
                let pos = GridCell::new(x, y).to_position();
                let zone = l.zone_for(&pos).unwrap();
                assert!(x >= zone.origin.x && x < zone.origin.x + zone.width);
                assert!(y >= zone.origin.y && y < zone.origin.y + zone.height);
            }
        }
    }

    #[test]
    fn zone_membership_is_floor_division() {
        let l = learner();
        assert_eq!(l.zone_id_for(&Position::new(2.9, 0.0)), Some(ZoneId::new(0)));
        assert_eq!(l.zone_id_for(&Position::new(3.0, 0.0)), Some(ZoneId::new(1)));
        assert_eq!(l.zone_id_for(&Position::new(0.0, 3.5)), Some(ZoneId::new(6)));
        assert_eq!(l.zone_id_for(&Position::new(-0.1, 0.0)), None);
        assert_eq!(l.zone_id_for(&Position::new(18.0, 0.0)), None);
    }

    #[test]
    fn congestion_level_saturates_at_one() {
        let mut l = learner();
        let robots: Vec<Robot> = (0..5).map(|i| moving_robot(i, 1.5, 1.5)).collect();
        l.analyze(&robots);
        for zone in l.zones() {
            assert!((0.0..=1.0).contains(&zone.congestion_level));
        }
        let zone = l.zone_for(&Position::new(1.5, 1.5)).unwrap();
        assert_eq!(zone.congestion_level, 1.0);
        assert_eq!(zone.robot_count, 5);
    }

    #[test]
    fn idle_robots_count_but_do_not_congest() {
        let mut l = learner();
        let mut robot = moving_robot(0, 1.0, 1.0);
        robot.status = RobotStatus::Idle;
        l.analyze(&[robot]);
        let zone = l.zone_for(&Position::new(1.0, 1.0)).unwrap();
        assert_eq!(zone.robot_count, 1);
        assert_eq!(zone.congestion_level, 0.0);
        assert_eq!(zone.avg_speed, 1.0);
    }

    #[test]
    fn history_is_bounded() {
        let config = CongestionConfig {
            history_capacity: 4,
            ..CongestionConfig::default()
        };
        let mut l = CongestionLearner::new(6, 6, config).unwrap();
        for _ in 0..10 {
            l.analyze(&[]);
        }
        assert!(l.zones().iter().all(|z| z.history.len() == 4));
    }

    #[test]
    fn sustained_congestion_lowers_zone_speed() {
        let mut l = learner();
        let robots: Vec<Robot> = (0..3).map(|i| moving_robot(i, 1.5, 1.5)).collect();
        for _ in 0..5 {
            l.analyze(&robots);
        }
        let zone = l.zone_for(&Position::new(1.5, 1.5)).unwrap();
        assert_eq!(zone.avg_speed, 0.4);
    }

    #[test]
    fn speed_bands() {
        assert_eq!(speed_band(0.8), 0.4);
        assert_eq!(speed_band(0.6), 0.6);
        assert_eq!(speed_band(0.4), 0.8);
        assert_eq!(speed_band(0.3), 1.0);
    }

    #[test]
    fn adaptive_speed_is_smoothed_not_set() {
        let mut l = learner();
        let mut robot = moving_robot(0, 1.5, 1.5);
        robot.speed = 0.6;
        let speed = l.get_adaptive_speed(&robot, None, &[robot.clone()]);
        // Target 1.0, rate 0.1: 0.6 + 0.4 * 0.1.
        assert!(approx(speed, 0.64));
    }

    #[test]
    fn adaptive_speed_always_clamped() {
        let mut l = learner();
        let mut slow = moving_robot(0, 1.0, 1.0);
        slow.speed = -5.0;
        let mut fast = moving_robot(1, 1.0, 1.0);
        fast.speed = 9.0;
        let robots = vec![slow.clone(), fast.clone()];
        l.analyze(&robots);
        for robot in &robots {
            for priority in [None, Some(TaskPriority::Low), Some(TaskPriority::Critical)] {
                let speed = l.get_adaptive_speed(robot, priority, &robots);
                assert!((MIN_ROBOT_SPEED..=MAX_ROBOT_SPEED).contains(&speed));
            }
        }
    }

    #[test]
    fn hot_zone_ahead_caps_target() {
        let mut l = learner();
        let crowd: Vec<Robot> = (1..4).map(|i| moving_robot(i, 7.5, 1.5)).collect();
        l.analyze(&crowd);
        let mut robot = moving_robot(0, 1.0, 1.0);
        robot.speed = 1.0;
        robot.path.extend([GridCell::new(2, 1), GridCell::new(3, 1), GridCell::new(6, 1)]);
        let speed = l.get_adaptive_speed(&robot, None, &[robot.clone()]);
        // Target capped at 0.5: 1.0 - 0.5 * 0.1.
        assert!(approx(speed, 0.95));
    }

    #[test]
    fn congested_zone_counts_events() {
        let mut l = learner();
        let robots: Vec<Robot> = (0..3).map(|i| moving_robot(i, 1.5, 1.5)).collect();
        l.analyze(&robots);
        let first = robots.first().unwrap();
        let _ = l.get_adaptive_speed(first, Some(TaskPriority::Low), &robots);
        assert_eq!(l.get_metrics().total_congestion_events, 1);
    }

    #[test]
    fn collisions_slow_zone_and_raise_rate() {
        let mut l = learner();
        let before = l.learning_rate();
        for _ in 0..20 {
            l.record_collision(&Position::new(4.0, 4.0));
        }
        let zone = l.zone_for(&Position::new(4.0, 4.0)).unwrap();
        assert_eq!(zone.avg_speed, COLLISION_SPEED_FLOOR);
        assert_eq!(zone.collision_count, 20);
        assert!(l.learning_rate() > before);
        assert!(l.learning_rate() <= MAX_LEARNING_RATE);
    }

    #[test]
    fn learning_rate_follows_success_ratio() {
        let s = LearningState::new(0.1);
        let boosted = s.step(LearningSignal::TaskOutcome { success_ratio: 0.5 });
        assert!(approx(boosted.learning_rate, 0.11));
        let decayed = s.step(LearningSignal::TaskOutcome { success_ratio: 0.95 });
        assert!(approx(decayed.learning_rate, 0.095));
        let steady = s.step(LearningSignal::TaskOutcome { success_ratio: 0.8 });
        assert_eq!(steady.learning_rate, 0.1);
    }

    #[test]
    fn learning_rate_stays_in_bounds() {
        let mut s = LearningState::new(0.1);
        for _ in 0..200 {
            s = s.step(LearningSignal::TaskOutcome { success_ratio: 1.0 });
        }
        assert_eq!(s.learning_rate, MIN_LEARNING_RATE);
        for _ in 0..200 {
            s = s.step(LearningSignal::CollisionRecorded);
        }
        assert_eq!(s.learning_rate, MAX_LEARNING_RATE);
        assert_eq!(LearningState::new(5.0).learning_rate, MAX_LEARNING_RATE);
    }

    #[test]
    fn baseline_latches_once_and_ignores_zero() {
        let s = LearningState::new(0.1);
        let s = s.step(LearningSignal::BaselineCaptured { average_congestion: 0.0 });
        assert_eq!(s.baseline_congestion, None);
        let s = s.step(LearningSignal::BaselineCaptured { average_congestion: 0.4 });
        let s = s.step(LearningSignal::BaselineCaptured { average_congestion: 0.9 });
        assert_eq!(s.baseline_congestion, Some(0.4));
        assert!(approx(s.efficiency_gain(0.3), 25.0));
    }

    #[test]
    fn metrics_report_hot_zones() {
        let mut l = learner();
        let robots: Vec<Robot> = (0..2).map(|i| moving_robot(i, 1.5, 1.5)).collect();
        l.analyze(&robots);
        assert!(l.capture_baseline());
        let metrics = l.get_metrics();
        assert!(metrics.average_congestion > 0.0);
        assert!(metrics.congested_zones >= 1);
        assert_eq!(metrics.efficiency_gain, 0.0);
    }
}
