#![forbid(unsafe_code)]

//! Animation policy as data.
//!
//! Every tunable the animators read lives in [`GlideConfig`], loadable from
//! TOML at startup:
//!
//! ```toml
//! [scroll]
//! animation_length = 0.3
//! max_visual_offset = 3.0
//!
//! [cursor]
//! trail_size = 0.7
//! vfx = "railgun"
//! ```
//!
//! Missing sections and fields fall back to [`Default`], so an empty file is
//! a valid configuration. [`GlideConfig::validate`] reports out-of-range
//! values as a list instead of failing on the first one.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::cursor_vfx::VfxMode;

/// Top-level configuration for every animator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlideConfig {
    /// Per-window scroll and position springs.
    pub scroll: ScrollConfig,
    /// Cursor quad, blink, and VFX.
    pub cursor: CursorConfig,
    /// Tick cadence.
    pub scheduler: SchedulerConfig,
    /// Content-arrival policy for the primary terminal.
    pub rate: RateConfig,
}

/// Scroll and window-position spring tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll spring animation length (seconds).
    pub animation_length: f32,
    /// Largest visible scroll divergence, in lines, after a commit.
    pub max_visual_offset: f32,
    /// Window position spring animation length (seconds).
    pub position_animation_length: f32,
    /// Position offsets beyond this many cells snap instead of animating.
    pub position_snap_threshold: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            animation_length: 0.3,
            max_visual_offset: 3.0,
            position_animation_length: 0.15,
            position_snap_threshold: 64.0,
        }
    }
}

/// Cursor animation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Base corner animation length (seconds).
    pub animation_length: f32,
    /// Uniform animation length for short, typing-sized jumps (seconds).
    pub short_animation_length: f32,
    /// Trail strength in `[0, 1]`; 0 moves all corners together.
    pub trail_size: f32,
    /// Horizontal short-jump threshold, in cells.
    pub short_jump_cols: f32,
    /// Vertical short-jump threshold, in cells.
    pub short_jump_rows: f32,
    /// Blink opacity filter time constant (seconds).
    pub blink_smoothing: f32,
    /// Visual effect played on cursor jumps.
    pub vfx: VfxMode,
    /// Peak opacity of the effect.
    pub vfx_opacity: f32,
    /// Particle (and ring) lifetime in seconds.
    pub vfx_particle_lifetime: f32,
    /// Particles emitted per cell travelled.
    pub vfx_particle_density: f32,
    /// Particle speed in cells per second.
    pub vfx_particle_speed: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            animation_length: 0.15,
            short_animation_length: 0.04,
            trail_size: 0.7,
            short_jump_cols: 2.0,
            short_jump_rows: 0.001,
            blink_smoothing: 0.05,
            vfx: VfxMode::Disabled,
            vfx_opacity: 0.8,
            vfx_particle_lifetime: 0.5,
            vfx_particle_density: 7.0,
            vfx_particle_speed: 10.0,
        }
    }
}

/// Tick cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Display refresh rate the scheduler ticks at while active.
    pub refresh_rate_hz: f32,
    /// Upper bound on the `dt` handed to animators (seconds).
    pub max_frame_dt: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60.0,
            max_frame_dt: 0.1,
        }
    }
}

/// Content-arrival rate model and the policies it selects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Glide duration for sparse output (seconds).
    pub nominal_duration: f32,
    /// Glide duration for sustained streaming (seconds).
    pub min_duration: f32,
    /// EMA time constant (seconds).
    pub time_constant: f32,
    /// Rates at or below this (lines/s) use the nominal duration.
    pub low_rate: f32,
    /// Rates at or above this (lines/s) use the minimum duration.
    pub high_rate: f32,
    /// Single arrivals of at least this many lines use the spring drop.
    pub burst_lines: u32,
    /// Spring-drop animation length (seconds).
    pub spring_drop_duration: f32,
    /// Spring-drop bounce in `[0, 1)`.
    pub bounce: f32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            nominal_duration: 0.15,
            min_duration: 0.0,
            time_constant: 0.25,
            low_rate: 10.0,
            high_rate: 120.0,
            burst_lines: 40,
            spring_drop_duration: 0.35,
            bounce: 0.35,
        }
    }
}

/// Errors from loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl GlideConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML file and validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut positive = |name: &str, value: f32| {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        };

        positive("scroll.animation_length", self.scroll.animation_length);
        positive("scroll.max_visual_offset", self.scroll.max_visual_offset);
        positive(
            "scroll.position_animation_length",
            self.scroll.position_animation_length,
        );
        positive(
            "scroll.position_snap_threshold",
            self.scroll.position_snap_threshold,
        );
        positive("cursor.animation_length", self.cursor.animation_length);
        positive(
            "cursor.short_animation_length",
            self.cursor.short_animation_length,
        );
        positive("cursor.vfx_particle_lifetime", self.cursor.vfx_particle_lifetime);
        positive("scheduler.refresh_rate_hz", self.scheduler.refresh_rate_hz);
        positive("scheduler.max_frame_dt", self.scheduler.max_frame_dt);
        positive("rate.nominal_duration", self.rate.nominal_duration);
        positive("rate.time_constant", self.rate.time_constant);
        positive("rate.spring_drop_duration", self.rate.spring_drop_duration);

        if !(0.0..=1.0).contains(&self.cursor.trail_size) {
            errors.push(format!(
                "cursor.trail_size must be in [0, 1], got {}",
                self.cursor.trail_size
            ));
        }
        if !(0.0..=1.0).contains(&self.cursor.vfx_opacity) {
            errors.push(format!(
                "cursor.vfx_opacity must be in [0, 1], got {}",
                self.cursor.vfx_opacity
            ));
        }
        if self.cursor.blink_smoothing < 0.0 {
            errors.push("cursor.blink_smoothing must be >= 0".into());
        }
        if self.cursor.vfx_particle_density < 0.0 || self.cursor.vfx_particle_speed < 0.0 {
            errors.push("cursor.vfx particle density and speed must be >= 0".into());
        }
        if !(self.rate.min_duration >= 0.0 && self.rate.min_duration <= self.rate.nominal_duration)
        {
            errors.push(format!(
                "rate.min_duration must be in [0, nominal_duration], got {}",
                self.rate.min_duration
            ));
        }
        if self.rate.low_rate < 0.0 || self.rate.high_rate <= self.rate.low_rate {
            errors.push(format!(
                "rate.high_rate ({}) must exceed rate.low_rate ({}) >= 0",
                self.rate.high_rate, self.rate.low_rate
            ));
        }
        if self.rate.burst_lines == 0 {
            errors.push("rate.burst_lines must be > 0".into());
        }
        if !(0.0..1.0).contains(&self.rate.bounce) {
            errors.push(format!(
                "rate.bounce must be in [0, 1), got {}",
                self.rate.bounce
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GlideConfig::default().validate().is_empty());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = GlideConfig::from_toml_str("").unwrap();
        assert_eq!(config, GlideConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = GlideConfig::from_toml_str(
            r#"
            [scroll]
            max_visual_offset = 5.0

            [cursor]
            trail_size = 0.2
            vfx = "pixiedust"
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll.max_visual_offset, 5.0);
        assert_eq!(config.scroll.animation_length, 0.3);
        assert_eq!(config.cursor.trail_size, 0.2);
        assert_eq!(config.cursor.vfx, VfxMode::PixieDust);
    }

    #[test]
    fn invalid_values_are_all_reported() {
        let err = GlideConfig::from_toml_str(
            r#"
            [cursor]
            trail_size = 1.5

            [rate]
            bounce = 1.0
            burst_lines = 0
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 3, "{errors:?}");
                assert!(errors.iter().any(|e| e.contains("trail_size")));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = GlideConfig::from_toml_str("[scroll\nanimation_length = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glide.toml");
        std::fs::write(&path, "[scheduler]\nrefresh_rate_hz = 144.0\n").unwrap();
        let config = GlideConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.scheduler.refresh_rate_hz, 144.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GlideConfig::from_toml_file("/nonexistent/glide.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
