#![forbid(unsafe_code)]

//! Easing curves over normalized time.
//!
//! Every function maps `t ∈ [0, 1]` to progress in `[0, 1]` with
//! `f(0) = 0` and `f(1) = 1`. Inputs outside the range are clamped.

/// Signature shared by all easing curves.
pub type EasingFn = fn(f32) -> f32;

/// Identity.
#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-out: fast start, gentle landing.
#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Exponential ease-out.
#[must_use]
pub fn ease_out_expo(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f32.powf(-10.0 * t)
    }
}

/// Cubic ease-in-out.
#[must_use]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}
