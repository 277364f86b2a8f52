#![forbid(unsafe_code)]

//! Core: spring physics, cursor animation, ring addressing, and the tick
//! scheduler.
//!
//! # Role in glide
//! `glide-core` holds the pieces with no knowledge of grids or protocols.
//! `glide-grid` builds window surfaces and the blend contract on top of
//! them; `glide-protocol` describes the events that drive those surfaces.
//!
//! # Primary responsibilities
//! - **SpringAxis**: closed-form critically damped spring, frame-rate
//!   independent.
//! - **CursorQuadAnimator**: four sprung corners with a directional trail,
//!   blink, and optional jump effects.
//! - **RingIndex**: fixed-capacity ring with O(1) rotation.
//! - **RateEstimator**: smoothed output rate mapped to an arrival policy.
//! - **AnimationScheduler**: ticks only while something moves.
//! - **GlideConfig**: every tunable, loadable from TOML.

pub mod animation;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod rate;
pub mod ring;
pub mod scheduler;

pub use animation::SpringAxis;
pub use config::{ConfigError, GlideConfig};
pub use geometry::{Point, Size};
pub use rate::{AnimationPolicy, RateEstimator};
pub use ring::RingIndex;
pub use scheduler::{Animatable, AnimationScheduler, PollOutcome, SchedulerState, WakeHandle};
