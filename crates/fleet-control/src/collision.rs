//! Pairwise proximity checks and right-of-way arbitration.
//!
//! Every unordered pair of robots is examined once per tick, lower index
//! first. Each pair falls into at most one tier, checked in this order:
//!
//! 1. **Critical avoidance** (`distance < collision_distance`, any status):
//!    the lower-priority robot yields at exactly `yield_speed`.
//! 2. **Collision avoided** (both moving, `distance < critical_distance`):
//!    the counter always increments; closing robots are throttled and an
//!    event is emitted only if at least one robot is closing.
//! 3. **Near miss** (`critical_distance <= distance < warning_distance`):
//!    only the first robot of the pair is considered; if it is closing on
//!    the second its speed is capped.
//!
//! Priority is the rank of the robot's current task (0 without one). Equal
//! ranks resolve against the robot with the higher index.
//!
//! After all pairs, robots whose nearest neighbour is beyond the warning
//! distance recover speed by `relax_step`, up to 1.0.

use fleet_types::{CollisionEvent, CollisionKind, Position, Robot, RobotStatus};

use crate::config::MotionConfig;

/// Result of one arbitration pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Events in detection order.
    pub events: Vec<CollisionEvent>,
    /// Moving pairs found inside the critical distance.
    pub collisions_avoided: u32,
    /// Near-miss events.
    pub near_misses: u32,
    /// Critical-avoidance events.
    pub critical_avoidances: u32,
    /// Pair midpoints for critical and collision-avoided events, to be fed
    /// to the congestion learner.
    pub collision_sites: Vec<Position>,
}

/// Whether `robot`'s next waypoint brings it closer to `other`.
fn is_closing(robot: &Robot, other: &Position) -> bool {
    if robot.status != RobotStatus::Moving {
        return false;
    }
    robot.path.front().is_some_and(|next| {
        next.to_position().distance_to(other) < robot.position.distance_to(other)
    })
}

/// Index of the robot that gives way: lower rank, or the higher index on a tie.
fn loser(i: usize, j: usize, ranks: &[u8]) -> usize {
    let rank_i = ranks.get(i).copied().unwrap_or(0);
    let rank_j = ranks.get(j).copied().unwrap_or(0);
    if rank_i < rank_j { i } else { j }
}

fn cap_speed(robots: &mut [Robot], index: usize, cap: f64) {
    if let Some(robot) = robots.get_mut(index) {
        robot.speed = robot.speed.min(cap);
    }
}

fn set_speed(robots: &mut [Robot], index: usize, speed: f64) {
    if let Some(robot) = robots.get_mut(index) {
        robot.speed = speed;
    }
}

/// Pair data copied out before mutation.
struct PairView {
    distance: f64,
    midpoint: Position,
    both_moving: bool,
    closing_i: bool,
    closing_j: bool,
    ids: Vec<fleet_types::RobotId>,
}

fn view(a: &Robot, b: &Robot) -> PairView {
    PairView {
        distance: a.position.distance_to(&b.position),
        midpoint: a.position.midpoint(&b.position),
        both_moving: a.status == RobotStatus::Moving && b.status == RobotStatus::Moving,
        closing_i: is_closing(a, &b.position),
        closing_j: is_closing(b, &a.position),
        ids: vec![a.id, b.id],
    }
}

/// Run one all-pairs arbitration pass, mutating robot speeds in place.
///
/// `ranks[i]` is the right-of-way rank of `robots[i]`.
pub fn arbitrate(robots: &mut [Robot], ranks: &[u8], config: &MotionConfig) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut nearest = vec![f64::INFINITY; robots.len()];

    for i in 0..robots.len() {
        for j in i.saturating_add(1)..robots.len() {
            let pair = match (robots.get(i), robots.get(j)) {
                (Some(a), Some(b)) => view(a, b),
                _ => continue,
            };
            for index in [i, j] {
                if let Some(slot) = nearest.get_mut(index) {
                    *slot = slot.min(pair.distance);
                }
            }

            if pair.distance < config.collision_distance {
                let yielder = loser(i, j, ranks);
                set_speed(robots, yielder, config.yield_speed);
                report.critical_avoidances = report.critical_avoidances.saturating_add(1);
                report.collision_sites.push(pair.midpoint);
                let yielder_id = robots.get(yielder).map(|r| r.id);
                tracing::debug!(ids = ?pair.ids, distance = pair.distance, yielder = ?yielder_id, "critical avoidance");
                report.events.push(CollisionEvent {
                    kind: CollisionKind::CriticalAvoidance,
                    description: describe(&pair, "critical proximity, lower priority yields"),
                    robot_ids: pair.ids,
                    distance: pair.distance,
                });
            } else if pair.both_moving && pair.distance < config.critical_distance {
                report.collisions_avoided = report.collisions_avoided.saturating_add(1);
                match (pair.closing_i, pair.closing_j) {
                    (true, true) => {
                        cap_speed(robots, loser(i, j, ranks), config.mutual_throttle_speed);
                    }
                    (true, false) => cap_speed(robots, i, config.single_throttle_speed),
                    (false, true) => cap_speed(robots, j, config.single_throttle_speed),
                    (false, false) => {}
                }
                if pair.closing_i || pair.closing_j {
                    report.collision_sites.push(pair.midpoint);
                    tracing::debug!(ids = ?pair.ids, distance = pair.distance, "collision avoided");
                    report.events.push(CollisionEvent {
                        kind: CollisionKind::CollisionAvoided,
                        description: describe(&pair, "closing inside critical distance, throttled"),
                        robot_ids: pair.ids,
                        distance: pair.distance,
                    });
                }
            } else if pair.distance >= config.critical_distance
                && pair.distance < config.warning_distance
                && pair.closing_i
            {
                cap_speed(robots, i, config.near_miss_speed_cap);
                report.near_misses = report.near_misses.saturating_add(1);
                tracing::debug!(ids = ?pair.ids, distance = pair.distance, "near miss");
                report.events.push(CollisionEvent {
                    kind: CollisionKind::NearMiss,
                    description: describe(&pair, "approaching inside warning distance"),
                    robot_ids: pair.ids,
                    distance: pair.distance,
                });
            }
        }
    }

    for (robot, closest) in robots.iter_mut().zip(nearest) {
        if closest > config.warning_distance && robot.speed < 1.0 {
            robot.speed = (robot.speed + config.relax_step).min(1.0);
        }
    }
    report
}

fn describe(pair: &PairView, what: &str) -> String {
    let names: Vec<String> = pair.ids.iter().map(ToString::to_string).collect();
    format!("{} at {:.2}: {what}", names.join("/"), pair.distance)
}
