#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`spring`] | Single-axis critically damped spring |
//! | [`easing`] | Easing curves for timed glides |
//! | [`cursor_quad`] | Four-corner cursor with directional trail |
//! | [`blink`] | Cursor blink phases and opacity filter |
//! | [`cursor_vfx`] | Ring and particle effects on cursor jumps |

pub mod blink;
pub mod cursor_quad;
pub mod cursor_vfx;
pub mod easing;
pub mod spring;

pub use blink::{BlinkPhase, BlinkTimings, CursorBlink};
pub use cursor_quad::{CursorMove, CursorQuadAnimator, CursorShape, CursorTarget};
pub use cursor_vfx::{CursorVfx, VfxMode};
pub use easing::EasingFn;
pub use spring::{SETTLE_EPSILON, SpringAxis};
