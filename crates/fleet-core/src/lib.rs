//! Simulation clock, tick cycle, and orchestration for the fleet simulation.
//!
//! This crate sequences one tick of the warehouse: congestion analysis,
//! adaptive-speed motion, collision arbitration, and task assignment. It
//! also provides the host-facing [`Simulation`] facade and an async run loop.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and simulated milliseconds.
//! - [`config`] -- Configuration loading from `fleet-config.yaml` into
//!   strongly-typed structs.
//! - [`runner`] -- [`TaskSource`] and [`TickCallback`] traits and the timed
//!   tick loop.
//! - [`simulation`] -- [`Simulation`]: tick, submit, snapshot, reset, robot
//!   commands.
//! - [`tick`] -- The phase-ordered tick cycle and cumulative [`FleetStats`].
//!
//! [`TaskSource`]: runner::TaskSource
//! [`TickCallback`]: runner::TickCallback
//! [`FleetStats`]: tick::FleetStats

pub mod clock;
pub mod config;
pub mod runner;
pub mod simulation;
pub mod tick;

pub use config::SimulationConfig;
pub use simulation::{Simulation, SimulationError, SimulationSnapshot};
