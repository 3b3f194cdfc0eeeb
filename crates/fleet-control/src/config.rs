//! Tunable parameters for motion, collision arbitration, and congestion
//! learning.
//!
//! These structs are deserialized from the `motion` and `congestion`
//! sections of `fleet-config.yaml`. Every field has a default, so a partial
//! section is valid. Fixed ratios of the learner (speed bands, boost and
//! decay factors) are module constants in [`crate::congestion`].

use serde::{Deserialize, Serialize};

/// Motion and collision-avoidance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Battery percentage drained per simulated second of movement
    /// (scaled by the global speed multiplier). Default: 0.5.
    #[serde(default = "default_battery_drain_per_second")]
    pub battery_drain_per_second: f64,

    /// Consecutive ticks a robot may wait on a waypoint held by another
    /// robot before it abandons its assignment. Default: 40.
    #[serde(default = "default_max_blocked_ticks")]
    pub max_blocked_ticks: u32,

    /// Distance below which a pair is a critical avoidance. Default: 0.5.
    #[serde(default = "default_collision_distance")]
    pub collision_distance: f64,

    /// Distance below which two moving robots are throttled. Default: 1.0.
    #[serde(default = "default_critical_distance")]
    pub critical_distance: f64,

    /// Distance below which a closing robot records a near miss. Default: 2.0.
    #[serde(default = "default_warning_distance")]
    pub warning_distance: f64,

    /// Speed forced on the robot that yields right-of-way. Default: 0.2.
    #[serde(default = "default_yield_speed")]
    pub yield_speed: f64,

    /// Speed cap when both robots close on each other. Default: 0.3.
    #[serde(default = "default_mutual_throttle_speed")]
    pub mutual_throttle_speed: f64,

    /// Speed cap when only one robot closes on the other. Default: 0.4.
    #[serde(default = "default_single_throttle_speed")]
    pub single_throttle_speed: f64,

    /// Speed cap after a near miss. Default: 0.7.
    #[serde(default = "default_near_miss_speed_cap")]
    pub near_miss_speed_cap: f64,

    /// Per-tick speed recovery for robots with clear surroundings. Default: 0.15.
    #[serde(default = "default_relax_step")]
    pub relax_step: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            battery_drain_per_second: default_battery_drain_per_second(),
            max_blocked_ticks: default_max_blocked_ticks(),
            collision_distance: default_collision_distance(),
            critical_distance: default_critical_distance(),
            warning_distance: default_warning_distance(),
            yield_speed: default_yield_speed(),
            mutual_throttle_speed: default_mutual_throttle_speed(),
            single_throttle_speed: default_single_throttle_speed(),
            near_miss_speed_cap: default_near_miss_speed_cap(),
            relax_step: default_relax_step(),
        }
    }
}

impl MotionConfig {
    /// Whether the distance thresholds are positive and strictly increasing.
    pub fn thresholds_are_ordered(&self) -> bool {
        self.collision_distance > 0.0
            && self.collision_distance < self.critical_distance
            && self.critical_distance < self.warning_distance
    }
}

/// Congestion learner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionConfig {
    /// Side length of a square congestion zone, in cells. Default: 3.
    #[serde(default = "default_zone_size")]
    pub zone_size: u32,

    /// Number of past congestion levels kept per zone. Default: 50.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Starting speed smoothing coefficient. Default: 0.1.
    #[serde(default = "default_initial_learning_rate")]
    pub initial_learning_rate: f64,

    /// Radius within which neighbour speeds are averaged in. Default: 2.0.
    #[serde(default = "default_neighbor_radius")]
    pub neighbor_radius: f64,

    /// Number of upcoming waypoints inspected for hot zones. Default: 5.
    #[serde(default = "default_lookahead_waypoints")]
    pub lookahead_waypoints: usize,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            zone_size: default_zone_size(),
            history_capacity: default_history_capacity(),
            initial_learning_rate: default_initial_learning_rate(),
            neighbor_radius: default_neighbor_radius(),
            lookahead_waypoints: default_lookahead_waypoints(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_battery_drain_per_second() -> f64 {
    0.5
}

const fn default_max_blocked_ticks() -> u32 {
    40
}

const fn default_collision_distance() -> f64 {
    0.5
}

const fn default_critical_distance() -> f64 {
    1.0
}

const fn default_warning_distance() -> f64 {
    2.0
}

const fn default_yield_speed() -> f64 {
    0.2
}

const fn default_mutual_throttle_speed() -> f64 {
    0.3
}

const fn default_single_throttle_speed() -> f64 {
    0.4
}

const fn default_near_miss_speed_cap() -> f64 {
    0.7
}

const fn default_relax_step() -> f64 {
    0.15
}

const fn default_zone_size() -> u32 {
    3
}

const fn default_history_capacity() -> usize {
    50
}

const fn default_initial_learning_rate() -> f64 {
    0.1
}

const fn default_neighbor_radius() -> f64 {
    2.0
}

const fn default_lookahead_waypoints() -> usize {
    5
}
