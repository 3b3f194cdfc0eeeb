//! Type-safe identifier wrappers around stable integer indices.
//!
//! Robots and tasks live in arenas owned by the simulation. Every component
//! refers to them through these ids rather than holding references, so the
//! tick phases never alias mutable state.
//!
//! Robot ids are dense: `RobotId(n)` is the robot at fleet index `n`. Task
//! ids are allocated in submission order and never reused within a run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around a `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw index.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner index value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// Return the inner value as a `usize` for arena lookups.
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Return the id that follows this one.
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a robot; equal to its index in the fleet.
    RobotId, "R"
}

define_id! {
    /// Unique identifier for a task; allocated in submission order.
    TaskId, "T"
}

define_id! {
    /// Identifier of a congestion zone; row-major index into the zone tiling.
    ZoneId, "Z"
}
