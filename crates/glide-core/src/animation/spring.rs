#![forbid(unsafe_code)]

//! Single-axis critically damped spring.
//!
//! A [`SpringAxis`] stores only the *offset from rest* and the current
//! velocity. The owner keeps the rest position (a target row, a corner
//! destination) and renders at `rest + position`. Retargeting therefore
//! never needs to know where the spring started: it only rewrites the
//! distance still owed.
//!
//! # Model
//!
//! Critically damped harmonic oscillator (ζ = 1) with natural frequency
//! `ω = 4 / animation_length`, which covers ~98% of the distance within
//! `animation_length`. The update is the closed-form solution, so the
//! result is exact for any `dt` and independent of frame rate:
//!
//! ```text
//! a  = x0
//! b  = x0·ω + v0
//! c  = e^(-ω·dt)
//! x' = (a + b·dt)·c
//! v' = c·(-a·ω - b·dt·ω + b)
//! ```
//!
//! # Invariants
//!
//! 1. `position == 0` is rest; anything else is mid-flight.
//! 2. Starting from zero velocity, repeated [`SpringAxis::advance`] calls
//!    shrink `|position|` toward zero without crossing it.
//! 3. Residuals below [`SETTLE_EPSILON`] are reported as settled but left in
//!    place, so a later retarget continues from the true rendered value.
//!
//! # Failure Modes
//!
//! - `animation_length <= dt`: snaps straight to rest.
//! - Non-finite inputs: the axis is reset to rest rather than propagating
//!   NaN into vertex data.

/// Offset magnitude below which a spring reports itself settled.
pub const SETTLE_EPSILON: f32 = 0.01;

/// Lower bound on the damping ratio used by [`SpringAxis::advance_bouncy`].
const MIN_DAMPING_RATIO: f32 = 0.05;

/// One axis of a critically damped spring, stored as an offset from rest.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpringAxis {
    position: f32,
    velocity: f32,
}

impl SpringAxis {
    /// A spring at rest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
        }
    }

    /// A spring displaced by `position` with zero velocity.
    #[must_use]
    pub const fn displaced(position: f32) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    /// Current offset from rest.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> f32 {
        self.position
    }

    /// Current velocity (offset units per second).
    #[inline]
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Whether the remaining offset is below [`SETTLE_EPSILON`].
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.position.abs() < SETTLE_EPSILON
    }

    /// Rewrite the distance still owed, keeping the current velocity so an
    /// in-flight motion bends toward the new rest instead of restarting.
    pub fn retarget(&mut self, offset: f32) {
        self.position = offset;
    }

    /// Add `delta` to the distance still owed.
    pub fn shift(&mut self, delta: f32) {
        self.position += delta;
    }

    /// Clamp the owed distance to `[-bound, bound]`.
    pub fn clamp_position(&mut self, bound: f32) {
        let bound = bound.abs();
        self.position = self.position.clamp(-bound, bound);
    }

    /// Force the spring to rest.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = 0.0;
    }

    /// Advance by `dt` seconds. Returns whether the spring is still moving.
    pub fn advance(&mut self, dt: f32, animation_length: f32) -> bool {
        if !(dt.is_finite() && animation_length.is_finite())
            || !(self.position.is_finite() && self.velocity.is_finite())
        {
            self.reset();
            return false;
        }
        if animation_length <= dt {
            self.reset();
            return false;
        }
        if dt <= 0.0 {
            return !self.is_settled();
        }
        if self.position == 0.0 && self.velocity == 0.0 {
            return false;
        }

        let omega = 4.0 / animation_length;
        let a = self.position;
        let b = self.position * omega + self.velocity;
        let c = (-omega * dt).exp();

        self.position = (a + b * dt) * c;
        self.velocity = c * (-a * omega - b * dt * omega + b);

        !self.is_settled()
    }

    /// Advance as an under-damped spring with damping ratio `1 - bounce`.
    ///
    /// Used for the spring-drop arrival style, where a visible overshoot is
    /// the point. `bounce <= 0` is the critically damped [`advance`].
    ///
    /// [`advance`]: SpringAxis::advance
    pub fn advance_bouncy(&mut self, dt: f32, animation_length: f32, bounce: f32) -> bool {
        let zeta = (1.0 - bounce).clamp(MIN_DAMPING_RATIO, 1.0);
        if zeta >= 1.0 {
            return self.advance(dt, animation_length);
        }
        if !(dt.is_finite() && animation_length.is_finite())
            || !(self.position.is_finite() && self.velocity.is_finite())
        {
            self.reset();
            return false;
        }
        if animation_length <= dt {
            self.reset();
            return false;
        }
        if dt <= 0.0 {
            return !self.is_settled();
        }

        let omega = 4.0 / animation_length;
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let decay_rate = zeta * omega;

        let a = self.position;
        let b = (self.velocity + decay_rate * a) / omega_d;
        let envelope = (-decay_rate * dt).exp();
        let (sin, cos) = (omega_d * dt).sin_cos();

        self.position = envelope * (a * cos + b * sin);
        self.velocity =
            envelope * ((b * omega_d - decay_rate * a) * cos - (a * omega_d + decay_rate * b) * sin);

        // Zero crossings pass through tiny positions at full speed.
        self.position.abs() >= SETTLE_EPSILON || self.velocity.abs() >= SETTLE_EPSILON * omega
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DT_60: f32 = 1.0 / 60.0;

    #[test]
    fn scroll_spring_settles_within_budget() {
        let mut spring = SpringAxis::displaced(-5.0);
        let mut steps = 0;
        while spring.advance(DT_60, 0.3) {
            assert!(spring.position() <= 0.0, "crossed zero at step {steps}");
            steps += 1;
            assert!(steps < 100, "not settled after 100 steps");
        }
        assert!(spring.position().abs() < SETTLE_EPSILON);
        assert!(steps < 100);
    }

    #[test]
    fn snaps_when_length_not_longer_than_dt() {
        let mut spring = SpringAxis::displaced(3.0);
        assert!(!spring.advance(0.5, 0.5));
        assert_eq!(spring.position(), 0.0);
        assert_eq!(spring.velocity(), 0.0);

        let mut spring = SpringAxis::displaced(3.0);
        assert!(!spring.advance(0.5, 0.0));
        assert_eq!(spring.position(), 0.0);
    }

    #[test]
    fn residual_is_left_in_place() {
        let mut spring = SpringAxis::displaced(1.0);
        while spring.advance(DT_60, 0.2) {}
        // Settled, but the tail is not forced to an exact zero.
        assert!(spring.is_settled());
        assert!(spring.position() != 0.0);
    }

    #[test]
    fn rest_spring_reports_settled() {
        let mut spring = SpringAxis::new();
        assert!(!spring.advance(DT_60, 0.3));
        assert_eq!(spring, SpringAxis::new());
    }

    #[test]
    fn retarget_preserves_velocity() {
        let mut spring = SpringAxis::displaced(-4.0);
        spring.advance(DT_60, 0.3);
        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        spring.retarget(-6.0);
        assert_eq!(spring.position(), -6.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn shift_and_clamp() {
        let mut spring = SpringAxis::new();
        spring.shift(-10.0);
        spring.clamp_position(3.0);
        assert_eq!(spring.position(), -3.0);
        spring.shift(8.0);
        spring.clamp_position(-3.0);
        assert_eq!(spring.position(), 3.0);
    }

    #[test]
    fn zero_dt_keeps_state() {
        let mut spring = SpringAxis::displaced(2.0);
        assert!(spring.advance(0.0, 0.3));
        assert_eq!(spring.position(), 2.0);
    }

    #[test]
    fn non_finite_input_resets() {
        let mut spring = SpringAxis::displaced(2.0);
        assert!(!spring.advance(f32::NAN, 0.3));
        assert_eq!(spring, SpringAxis::new());

        let mut spring = SpringAxis::displaced(f32::INFINITY);
        assert!(!spring.advance(DT_60, 0.3));
        assert_eq!(spring, SpringAxis::new());
    }

    #[test]
    fn frame_rate_independent() {
        let mut coarse = SpringAxis::displaced(10.0);
        let mut fine = SpringAxis::displaced(10.0);
        coarse.advance(0.1, 0.5);
        for _ in 0..10 {
            fine.advance(0.01, 0.5);
        }
        assert!(
            (coarse.position() - fine.position()).abs() < 1e-3,
            "coarse {} fine {}",
            coarse.position(),
            fine.position()
        );
    }

    #[test]
    fn bouncy_spring_overshoots_then_settles() {
        let mut spring = SpringAxis::displaced(-5.0);
        let mut crossed = false;
        let mut steps = 0;
        while spring.advance_bouncy(DT_60, 0.35, 0.5) {
            if spring.position() > SETTLE_EPSILON {
                crossed = true;
            }
            steps += 1;
            assert!(steps < 1_000, "bouncy spring never settled");
        }
        assert!(crossed, "expected an overshoot past rest");
    }

    #[test]
    fn zero_bounce_matches_critical() {
        let mut bouncy = SpringAxis::displaced(-5.0);
        let mut critical = SpringAxis::displaced(-5.0);
        bouncy.advance_bouncy(DT_60, 0.3, 0.0);
        critical.advance(DT_60, 0.3);
        assert_eq!(bouncy, critical);
    }
}
