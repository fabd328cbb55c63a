#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) motion.
//!
//! Pieces travel from their origin to their destination on a spring rather
//! than on a fixed-duration tween, so a destination that changes mid-flight
//! (a drop retargeted to the bucket, say) bends the path smoothly instead of
//! restarting it.
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Integration
//!
//! Semi-implicit Euler. `advance()` accepts a `Duration` and subdivides it
//! into steps of at most 4ms for stability with stiff springs.
//!
//! # Invariants
//!
//! 1. A spring at rest (`is_at_rest() == true`) stays put until
//!    `set_target()`, `launch()`, or `reset()` wakes it.
//! 2. Stiffness is at least [`MIN_STIFFNESS`]; damping is non-negative.
//! 3. When the spring comes to rest its position snaps exactly onto the
//!    target, so callers can compare against the target without epsilon.
//!
//! # Failure Modes
//!
//! - Very large dt: consumed in full. Integration stops early once the
//!   spring settles, so a long frame costs at most one substep per 4ms of
//!   motion actually simulated.
//! - Zero damping: oscillates forever; `is_at_rest()` may never be true.

use std::time::Duration;

use super::Animation;
use crate::geometry::Point;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Default rest threshold for normalized springs.
const DEFAULT_REST_THRESHOLD: f64 = 0.001;

/// Default velocity threshold for normalized springs.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.01;

/// Minimum stiffness to prevent degenerate springs.
pub const MIN_STIFFNESS: f64 = 0.1;

/// Rest threshold for scene-space springs, in scene units.
const SCENE_REST_THRESHOLD: f64 = 0.05;

/// Velocity threshold for scene-space springs, in scene units per second.
const SCENE_VELOCITY_THRESHOLD: f64 = 0.5;

/// A one-dimensional damped spring.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`.
    ///
    /// Default parameters: stiffness = 170.0, damping = 26.0.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: 170.0,
            damping: 26.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Create a spring animating from 0.0 to 1.0.
    #[must_use]
    pub fn normalized() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Set stiffness (builder pattern). Clamped to [`MIN_STIFFNESS`].
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Set velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Change the target. Wakes the spring if it was at rest.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Restart from `from` with zero velocity, heading to `to`.
    pub fn launch(&mut self, from: f64, to: f64) {
        self.initial = from;
        self.position = from;
        self.velocity = 0.0;
        self.target = to;
        self.at_rest = (from - to).abs() < self.rest_threshold;
        if self.at_rest {
            self.position = to;
        }
    }

    /// Teleport onto `value` and rest there.
    pub fn snap_to(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    fn settled(&self) -> bool {
        (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
            if self.settled() {
                self.position = self.target;
                self.velocity = 0.0;
                self.at_rest = true;
                return;
            }
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}

// ---------------------------------------------------------------------------
// SpringPoint
// ---------------------------------------------------------------------------

/// Two springs driving a point in scene space.
///
/// Rest thresholds are expressed in scene units rather than normalized
/// progress, so a piece 300 units away settles in well under a second with
/// a critically damped tuning (`damping = 2 * sqrt(stiffness)`).
#[derive(Debug, Clone)]
pub struct SpringPoint {
    x: Spring,
    y: Spring,
}

impl SpringPoint {
    /// Spring at rest on `at`, tuned with `stiffness` and `damping`.
    #[must_use]
    pub fn new(at: Point, stiffness: f64, damping: f64) -> Self {
        let axis = |v: f64| {
            let mut s = Spring::new(v, v)
                .with_stiffness(stiffness)
                .with_damping(damping)
                .with_rest_threshold(SCENE_REST_THRESHOLD)
                .with_velocity_threshold(SCENE_VELOCITY_THRESHOLD);
            s.snap_to(v);
            s
        };
        Self {
            x: axis(at.x),
            y: axis(at.y),
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x.position(), self.y.position())
    }

    #[must_use]
    pub fn target(&self) -> Point {
        Point::new(self.x.target(), self.y.target())
    }

    /// Restart motion from `from` toward `to`.
    pub fn launch(&mut self, from: Point, to: Point) {
        self.x.launch(from.x, to.x);
        self.y.launch(from.y, to.y);
    }

    /// Keep the current position and velocity but head for `to`.
    pub fn set_target(&mut self, to: Point) {
        self.x.set_target(to.x);
        self.y.set_target(to.y);
    }

    /// Teleport onto `at` (used while the pointer owns the piece).
    pub fn snap_to(&mut self, at: Point) {
        self.x.snap_to(at.x);
        self.y.snap_to(at.y);
    }

    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }
}

impl Animation for SpringPoint {
    fn tick(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.is_at_rest()
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
