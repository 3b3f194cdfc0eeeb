//! Fleet control for the warehouse simulation.
//!
//! Everything that changes robot and task state inside a tick lives here:
//! the fleet arenas, congestion learning, per-robot motion, pairwise
//! collision arbitration, and task assignment. The tick orchestrator in
//! `fleet-core` sequences these phases.
//!
//! # Modules
//!
//! - [`assigner`] -- Greedy nearest-idle-robot task assignment.
//! - [`collision`] -- All-pairs proximity tiers and right-of-way.
//! - [`config`] -- Motion and congestion tunables.
//! - [`congestion`] -- Zone tiling, congestion history, adaptive speed.
//! - [`error`] -- Error types for construction and host commands.
//! - [`fleet`] -- Robot and task arenas indexed by id.
//! - [`motion`] -- Moving robots along their paths.

pub mod assigner;
pub mod collision;
pub mod config;
pub mod congestion;
pub mod error;
pub mod fleet;
pub mod motion;

pub use assigner::{Assignment, AssignmentReport, assign_pending};
pub use collision::{CollisionReport, arbitrate};
pub use config::{CongestionConfig, MotionConfig};
pub use congestion::{CongestionLearner, LearningSignal, LearningState};
pub use error::ControlError;
pub use fleet::Fleet;
pub use motion::{MotionOutcome, MotionStep, advance_robot};
