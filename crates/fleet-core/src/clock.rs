//! Simulated time for the fleet simulation.
//!
//! The clock counts ticks and accumulates simulated milliseconds from each
//! tick's `delta_time`. Task timestamps are taken from this clock rather
//! than the wall clock, so a run replays identically and a reset returns
//! time to zero.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Elapsed milliseconds would overflow.
    #[error("elapsed time overflow")]
    ElapsedOverflow,

    /// The tick duration is negative, NaN, or infinite.
    #[error("invalid delta time: {0}")]
    InvalidDeltaTime(f64),
}

/// Tick counter plus simulated elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    /// Ticks completed so far.
    tick: u64,
    /// Simulated milliseconds elapsed.
    elapsed_ms: u64,
}

impl SimClock {
    /// A clock at tick 0, time 0.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            elapsed_ms: 0,
        }
    }

    /// Advance by one tick covering `delta_time` seconds. Returns the new
    /// tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDeltaTime`] for a negative or non-finite
    /// duration, and an overflow error if either counter would wrap.
    pub fn advance(&mut self, delta_time: f64) -> Result<u64, ClockError> {
        let step_ms = delta_ms(delta_time)?;
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed_ms = self
            .elapsed_ms
            .checked_add(step_ms)
            .ok_or(ClockError::ElapsedOverflow)?;
        self.tick = tick;
        self.elapsed_ms = elapsed_ms;
        Ok(tick)
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated milliseconds elapsed.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// 2^64, the first value that does not fit in a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Convert a tick duration in seconds to whole milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn delta_ms(delta_time: f64) -> Result<u64, ClockError> {
    if !delta_time.is_finite() || delta_time < 0.0 {
        return Err(ClockError::InvalidDeltaTime(delta_time));
    }
    let ms = (delta_time * 1000.0).round();
    if ms >= U64_LIMIT {
        return Err(ClockError::ElapsedOverflow);
    }
    // Non-negative and below u64::MAX after the checks above.
    Ok(ms as u64)
}
