#![forbid(unsafe_code)]

//! Pixel scrolling for the primary terminal.
//!
//! The terminal engine scrolls its own cell model and reports each scroll
//! with a [`ScrollCommand`]; plain output arriving at the bottom is reported
//! as a line count. Either way the screen jumps by whole lines, and this
//! module supplies the visual offset that eases it back. The arrival rate
//! picks the style: a short glide for sparse output, nearly instant while
//! streaming, a bouncy drop for one large burst.
//!
//! The offset is published as a [`PixelScrollUniform`] rounded to whole
//! pixels, shared by the background and glyph passes.

use glide_core::animation::EasingFn;
use glide_core::config::{RateConfig, ScrollConfig};
use glide_core::{Animatable, AnimationPolicy, RateEstimator, SpringAxis};
use glide_protocol::ScrollCommand;
use glide_protocol::scroll_sequence::DEFAULT_GRID;
use web_time::Instant;

use crate::blend::{PixelScrollUniform, ScrollBlendUniform};

#[derive(Debug, Clone, Copy)]
enum Motion {
    Rest,
    Glide {
        from: f32,
        elapsed: f32,
        duration: f32,
        easing: EasingFn,
    },
    Spring {
        animation_length: f32,
        bounce: f32,
    },
}

/// Scroll offset animator for the primary terminal grid.
#[derive(Debug, Clone)]
pub struct TerminalScroller {
    estimator: RateEstimator,
    spring: SpringAxis,
    motion: Motion,
    last_policy: Option<AnimationPolicy>,
    max_visual_offset: f32,
    cell_height: f32,
    grid: u64,
    grid_rows: u32,
    region: Option<(u32, u32)>,
}

impl TerminalScroller {
    #[must_use]
    pub fn new(rate: RateConfig, scroll: ScrollConfig, cell_height: f32, grid_rows: u32) -> Self {
        Self {
            estimator: RateEstimator::new(rate),
            spring: SpringAxis::new(),
            motion: Motion::Rest,
            last_policy: None,
            max_visual_offset: scroll.max_visual_offset,
            cell_height,
            grid: DEFAULT_GRID,
            grid_rows,
            region: None,
        }
    }

    /// Accept scroll reports for `grid` instead of the default grid.
    #[must_use]
    pub fn with_grid(mut self, grid: u64) -> Self {
        self.grid = grid;
        self
    }

    pub fn set_cell_height(&mut self, cell_height: f32) {
        self.cell_height = cell_height;
    }

    /// The terminal was resized. Any motion in flight is dropped.
    pub fn set_grid_rows(&mut self, rows: u32) {
        self.grid_rows = rows;
        self.region = None;
        self.stop();
    }

    fn stop(&mut self) {
        self.motion = Motion::Rest;
        self.spring.reset();
    }

    /// Apply a scroll report. Returns whether an animation started.
    ///
    /// Reports for other grids and empty regions are ignored.
    pub fn on_scroll(&mut self, command: &ScrollCommand, now: Instant) -> bool {
        if command.grid != self.grid {
            tracing::debug!(grid = command.grid, "scroll report for another grid");
            return false;
        }
        let Some(region) = command.region(self.grid_rows) else {
            tracing::debug!(?command, rows = self.grid_rows, "scroll report with empty region");
            return false;
        };
        self.region = Some(region);
        self.arrive(command.delta, now)
    }

    /// `lines` of output arrived at the bottom and pushed the screen up.
    pub fn on_content(&mut self, lines: u32, now: Instant) -> bool {
        self.region = None;
        self.arrive(i32::try_from(lines).unwrap_or(i32::MAX), now)
    }

    fn arrive(&mut self, delta: i32, now: Instant) -> bool {
        if delta == 0 {
            return false;
        }
        let policy = self.estimator.record(delta.unsigned_abs(), now);
        self.last_policy = Some(policy);

        let bound = self.max_visual_offset.min(self.grid_rows as f32);
        let offset = (self.offset() - delta as f32).clamp(-bound, bound);

        match policy {
            AnimationPolicy::Instant => self.stop(),
            AnimationPolicy::Glide { duration, easing } => {
                self.spring.reset();
                self.motion = Motion::Glide {
                    from: offset,
                    elapsed: 0.0,
                    duration,
                    easing,
                };
            }
            AnimationPolicy::SpringDrop {
                animation_length,
                bounce,
            } => {
                if !matches!(self.motion, Motion::Spring { .. }) {
                    self.spring = SpringAxis::new();
                }
                self.spring.retarget(offset);
                self.motion = Motion::Spring {
                    animation_length,
                    bounce,
                };
            }
        }
        !matches!(self.motion, Motion::Rest)
    }

    /// Visual offset in lines; negative while content is still rising.
    #[must_use]
    pub fn offset(&self) -> f32 {
        match self.motion {
            Motion::Rest => 0.0,
            Motion::Glide {
                from,
                elapsed,
                duration,
                easing,
            } => from * (1.0 - easing(elapsed / duration)),
            Motion::Spring { .. } => self.spring.position(),
        }
    }

    /// Policy chosen for the most recent arrival.
    #[must_use]
    pub fn last_policy(&self) -> Option<AnimationPolicy> {
        self.last_policy
    }

    /// Smoothed arrival rate, lines per second.
    #[must_use]
    pub fn rate_at(&self, now: Instant) -> f32 {
        self.estimator.rate_at(now)
    }

    /// Advance by `dt` seconds. Returns whether the offset is still moving.
    pub fn animate(&mut self, dt: f32) -> bool {
        match &mut self.motion {
            Motion::Rest => false,
            Motion::Glide {
                elapsed, duration, ..
            } => {
                *elapsed += dt.max(0.0);
                if *elapsed >= *duration {
                    self.stop();
                    false
                } else {
                    true
                }
            }
            Motion::Spring {
                animation_length,
                bounce,
            } => {
                let (length, bounce) = (*animation_length, *bounce);
                let moving = self.spring.advance_bouncy(dt, length, bounce);
                if !moving {
                    self.stop();
                }
                moving
            }
        }
    }

    #[must_use]
    pub fn pixel_offset(&self) -> f32 {
        self.offset() * self.cell_height
    }

    /// Whole-pixel Y offset for the background and glyph passes.
    #[must_use]
    pub fn pixel_uniform(&self) -> PixelScrollUniform {
        PixelScrollUniform::new(self.pixel_offset())
    }

    /// Blend snapshot for this frame. Without a reported region the whole
    /// grid scrolls.
    #[must_use]
    pub fn blend_uniform(&self, screen: (f32, f32), padding_top: f32) -> ScrollBlendUniform {
        ScrollBlendUniform::new(
            self.pixel_uniform().y_offset,
            screen,
            self.cell_height,
            self.region.unwrap_or((0, self.grid_rows)),
            padding_top,
        )
    }
}

impl Animatable for TerminalScroller {
    fn animate(&mut self, dt: f32) -> bool {
        TerminalScroller::animate(self, dt)
    }
}
