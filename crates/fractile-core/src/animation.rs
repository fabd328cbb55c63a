#![forbid(unsafe_code)]

//! Frame-driven motion primitives.
//!
//! Motion over time is expressed as incremental `tick(dt)` updates driven by
//! the host's frame loop. Nothing here blocks, sleeps, or owns a timer.

use std::time::Duration;

pub mod spring;

pub use spring::{Spring, SpringPoint};

/// A time-based animation advanced by the caller's frame clock.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has settled.
    fn is_complete(&self) -> bool;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Convert a frame delta in seconds into a [`Duration`], clamping negative
/// or non-finite input to zero.
#[must_use]
pub fn dt_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
