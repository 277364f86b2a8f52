#![forbid(unsafe_code)]

//! The editor's windowed display: every grid, the cursor, and the queue
//! that feeds them.
//!
//! Events arrive on any thread through an [`IngestSender`] and wait in a
//! channel until the render path calls [`Multigrid::drain`] at a tick
//! boundary, so cells and springs are never touched mid-frame. A `flush`
//! commits every surface's pending scroll and retargets the cursor.
//!
//! ```text
//!   ingest thread                 render thread
//!   ─────────────                 ─────────────
//!   sender.send(event) ──mpsc──▶  multigrid.drain()
//!   sender.send(Flush) ─wake──▶   scheduler.poll(now) → multigrid.animate(dt)
//! ```
//!
//! Events naming a grid that does not exist are dropped with a debug log.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, SendError, Sender};

use glide_core::animation::{
    BlinkTimings, CursorMove, CursorQuadAnimator, CursorShape, CursorTarget, CursorVfx,
};
use glide_core::{Animatable, GlideConfig, Point, Size, WakeHandle};
use glide_protocol::{HlAttrs, ModeCursorShape, ModeInfo, Rgb, UiEvent};

use crate::blend::ScrollBlendUniform;
use crate::cell::CellFlags;
use crate::surface::{GridSurface, ScrollRegion, SurfaceKind, ViewportMargins};

/// Grid id of the root grid.
pub const ROOT_GRID: u64 = 1;

/// Thread-safe handle for queueing events.
#[derive(Debug, Clone)]
pub struct IngestSender {
    tx: Sender<UiEvent>,
    wake: WakeHandle,
}

impl IngestSender {
    /// Queue `event`. A `flush` also wakes the scheduler.
    pub fn send(&self, event: UiEvent) -> Result<(), SendError<UiEvent>> {
        let flush = matches!(event, UiEvent::Flush);
        self.tx.send(event)?;
        if flush {
            self.wake.wake();
        }
        Ok(())
    }
}

/// What one [`Multigrid::drain`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Events applied.
    pub applied: usize,
    /// `flush` events among them.
    pub flushes: usize,
    /// Whether any surface or the cursor now needs ticks.
    pub needs_animation: bool,
}

/// Colors for highlight id 0 and unset attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub special: Rgb,
}

impl Default for DefaultColors {
    fn default() -> Self {
        Self {
            foreground: Rgb(0xff_ff_ff),
            background: Rgb(0x00_00_00),
            special: Rgb(0xff_00_00),
        }
    }
}

/// Concrete colors of a highlight id after defaults and `reverse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub special: Rgb,
}

/// The editor cursor: the sprung quad, its jump effect, and the cell it
/// targets.
#[derive(Debug, Clone)]
pub struct EditorCursor {
    pub quad: CursorQuadAnimator,
    pub vfx: CursorVfx,
    grid: u64,
    row: u32,
    col: u32,
}

impl EditorCursor {
    fn new(config: &GlideConfig) -> Self {
        Self {
            quad: CursorQuadAnimator::new(config.cursor),
            vfx: CursorVfx::from_config(&config.cursor),
            grid: ROOT_GRID,
            row: 0,
            col: 0,
        }
    }

    /// `(grid, row, col)` from the last `grid_cursor_goto`.
    #[must_use]
    pub fn cell(&self) -> (u64, u32, u32) {
        (self.grid, self.row, self.col)
    }
}

/// Every grid of the editor plus its cursor and style tables.
#[derive(Debug)]
pub struct Multigrid {
    surfaces: HashMap<u64, GridSurface>,
    next_sequence: u64,
    highlights: HashMap<u64, HlAttrs>,
    default_colors: DefaultColors,
    modes: Vec<ModeInfo>,
    cursor_style_enabled: bool,
    mode_index: usize,
    cursor: EditorCursor,
    cell: Size,
    config: GlideConfig,
    tx: Sender<UiEvent>,
    rx: Receiver<UiEvent>,
    wake: WakeHandle,
}

fn cursor_shape(shape: ModeCursorShape) -> CursorShape {
    match shape {
        ModeCursorShape::Block => CursorShape::Block,
        ModeCursorShape::Horizontal => CursorShape::Horizontal,
        ModeCursorShape::Vertical => CursorShape::Vertical,
    }
}

impl Multigrid {
    /// Create an empty multigrid. `wake` is the scheduler's handle, used by
    /// senders on `flush`.
    #[must_use]
    pub fn new(config: GlideConfig, cell: Size, wake: WakeHandle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            surfaces: HashMap::new(),
            next_sequence: 0,
            highlights: HashMap::new(),
            default_colors: DefaultColors::default(),
            modes: Vec::new(),
            cursor_style_enabled: false,
            mode_index: 0,
            cursor: EditorCursor::new(&config),
            cell,
            config,
            tx,
            rx,
            wake,
        }
    }

    /// A new sender for the ingest side.
    #[must_use]
    pub fn sender(&self) -> IngestSender {
        IngestSender {
            tx: self.tx.clone(),
            wake: self.wake.clone(),
        }
    }

    /// Apply everything queued so far.
    pub fn drain(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        while let Ok(event) = self.rx.try_recv() {
            report.applied += 1;
            if matches!(event, UiEvent::Flush) {
                report.flushes += 1;
            }
            report.needs_animation |= self.apply(event);
        }
        if report.applied > 0 {
            tracing::trace!(
                applied = report.applied,
                flushes = report.flushes,
                "ingest drained"
            );
        }
        report
    }

    /// Apply one event. Returns whether it left something to animate.
    pub fn apply(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::GridResize {
                grid,
                width,
                height,
            } => {
                let surface = self.surface_or_create(grid);
                if let Err(err) = surface.resize(width, height) {
                    tracing::warn!(grid, width, height, %err, "grid resize failed");
                }
                false
            }
            UiEvent::GridLine {
                grid,
                row,
                col_start,
                cells,
            } => {
                self.with_surface(grid, "grid_line", |s| s.draw_line(row, col_start, &cells));
                false
            }
            UiEvent::GridClear { grid } => {
                self.with_surface(grid, "grid_clear", GridSurface::clear);
                false
            }
            UiEvent::GridScroll {
                grid,
                top,
                bottom,
                left,
                right,
                rows,
                cols,
            } => {
                if cols != 0 {
                    tracing::trace!(grid, cols, "ignoring horizontal scroll");
                }
                let region = ScrollRegion {
                    top,
                    bottom,
                    left,
                    right,
                };
                self.with_surface(grid, "grid_scroll", |s| s.handle_scroll(region, rows));
                false
            }
            UiEvent::GridCursorGoto { grid, row, col } => {
                self.cursor.grid = grid;
                self.cursor.row = row;
                self.cursor.col = col;
                false
            }
            UiEvent::GridDestroy { grid } | UiEvent::WinClose { grid } => {
                if self.surfaces.remove(&grid).is_some() {
                    tracing::debug!(grid, "grid removed");
                } else {
                    tracing::debug!(grid, "close for unknown grid");
                }
                false
            }
            UiEvent::WinPos {
                grid,
                start_row,
                start_col,
                ..
            } => {
                self.with_surface(grid, "win_pos", |s| {
                    s.set_kind(SurfaceKind::Anchored);
                    s.set_hidden(false);
                    s.set_position(start_row as f32, start_col as f32);
                });
                self.surfaces.get(&grid).is_some_and(|s| !s.is_settled())
            }
            UiEvent::WinFloatPosition {
                grid,
                row,
                col,
                z_index,
            } => {
                self.with_surface(grid, "win_float_pos", |s| {
                    s.set_kind(SurfaceKind::Floating { z_index });
                    s.set_hidden(false);
                    s.set_position(row, col);
                });
                self.surfaces.get(&grid).is_some_and(|s| !s.is_settled())
            }
            UiEvent::WinViewport {
                grid,
                topline,
                botline,
                scroll_delta,
            } => {
                self.with_surface(grid, "win_viewport", |s| {
                    s.set_viewport(topline, botline, scroll_delta);
                });
                false
            }
            UiEvent::WinViewportMargins {
                grid,
                top,
                bottom,
                left,
                right,
            } => {
                let margins = ViewportMargins {
                    top,
                    bottom,
                    left,
                    right,
                };
                self.with_surface(grid, "win_viewport_margins", |s| s.set_margins(margins));
                false
            }
            UiEvent::WinHide { grid } => {
                self.with_surface(grid, "win_hide", |s| s.set_hidden(true));
                false
            }
            UiEvent::ModeInfoSet {
                cursor_style_enabled,
                modes,
            } => {
                self.cursor_style_enabled = cursor_style_enabled;
                self.modes = modes;
                false
            }
            UiEvent::ModeChange { mode, index } => {
                if index < self.modes.len() {
                    self.mode_index = index;
                } else {
                    tracing::debug!(mode = %mode, index, "mode index out of range");
                }
                false
            }
            UiEvent::DefaultColorsSet {
                foreground,
                background,
                special,
            } => {
                self.default_colors = DefaultColors {
                    foreground,
                    background,
                    special,
                };
                false
            }
            UiEvent::HlAttrDefine { id, attrs } => {
                self.highlights.insert(id, attrs);
                false
            }
            UiEvent::Flush => self.flush(),
        }
    }

    fn surface_or_create(&mut self, grid: u64) -> &mut GridSurface {
        let sequence = &mut self.next_sequence;
        let scroll = self.config.scroll;
        self.surfaces.entry(grid).or_insert_with(|| {
            let mut surface = GridSurface::new(grid, scroll);
            if grid != ROOT_GRID {
                surface.set_kind(SurfaceKind::Anchored);
            }
            surface.set_sequence(*sequence);
            *sequence += 1;
            tracing::debug!(grid, "grid created");
            surface
        })
    }

    fn with_surface(&mut self, grid: u64, event: &'static str, f: impl FnOnce(&mut GridSurface)) {
        match self.surfaces.get_mut(&grid) {
            Some(surface) => f(surface),
            None => tracing::debug!(grid, event, "event for unknown grid dropped"),
        }
    }

    fn flush(&mut self) -> bool {
        let mut animating = false;
        for surface in self.surfaces.values_mut() {
            animating |= surface.commit();
        }
        animating | self.retarget_cursor()
    }

    fn current_mode(&self) -> Option<&ModeInfo> {
        if self.cursor_style_enabled {
            self.modes.get(self.mode_index)
        } else {
            None
        }
    }

    fn retarget_cursor(&mut self) -> bool {
        let (grid, row, col) = self.cursor.cell();
        let Some(surface) = self.surfaces.get(&grid) else {
            tracing::debug!(grid, "cursor on unknown grid");
            return false;
        };
        let window = surface.target_position().unwrap_or(Point::ZERO);
        let origin = Point::new(
            (window.x + col as f32) * self.cell.width,
            (window.y + row as f32) * self.cell.height,
        );

        let mut target = CursorTarget::block(grid, origin, self.cell);
        let mut timings = BlinkTimings::default();
        if let Some(mode) = self.current_mode() {
            target.shape = cursor_shape(mode.cursor_shape);
            if mode.cell_percentage > 0 {
                target.cell_percentage = mode.cell_percentage as f32 / 100.0;
            }
            timings = BlinkTimings::new(mode.blinkwait, mode.blinkon, mode.blinkoff);
        }
        self.cursor.quad.set_blink_timings(timings);

        let from = self.cursor.quad.rendered_center();
        let movement = self.cursor.quad.update(target);
        match movement {
            CursorMove::Jump { travel } => self.cursor.vfx.on_jump(from, from + travel, self.cell),
            CursorMove::Snapped => self.cursor.vfx.on_snap(),
            CursorMove::Unchanged | CursorMove::ShortJump => {}
        }
        tracing::trace!(grid, row, col, ?movement, "cursor retargeted");
        !self.cursor.quad.is_settled()
    }

    /// Advance every surface, the cursor, and its effect.
    pub fn animate(&mut self, dt: f32) -> bool {
        let mut animating = false;
        for surface in self.surfaces.values_mut() {
            animating |= surface.animate(dt);
        }
        animating |= self.cursor.quad.animate(dt);
        let center = self.cursor.quad.rendered_center();
        animating |= self.cursor.vfx.update(dt, center);
        if self.cursor.quad.is_settled() {
            self.cursor.vfx.on_settle();
        }
        animating
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn surface(&self, grid: u64) -> Option<&GridSurface> {
        self.surfaces.get(&grid)
    }

    /// Number of live grids, hidden ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Visible surfaces in draw order: the root grid, anchored windows, then
    /// floating windows by z-index. Ties keep creation order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&GridSurface> {
        let mut visible: Vec<&GridSurface> =
            self.surfaces.values().filter(|s| !s.is_hidden()).collect();
        visible.sort_by_key(|s| {
            let layer = match s.kind() {
                SurfaceKind::Root => (0, 0),
                SurfaceKind::Anchored => (1, 0),
                SurfaceKind::Floating { z_index } => (2, z_index),
            };
            (layer, s.sequence())
        });
        visible
    }

    #[must_use]
    pub fn cursor(&self) -> &EditorCursor {
        &self.cursor
    }

    #[must_use]
    pub fn cell_size(&self) -> Size {
        self.cell
    }

    /// New font metrics. Takes effect at the next flush.
    pub fn set_cell_size(&mut self, cell: Size) {
        self.cell = cell;
    }

    /// Replace the tuning for every surface and the cursor. The cursor
    /// effect restarts.
    pub fn set_config(&mut self, config: GlideConfig) {
        for surface in self.surfaces.values_mut() {
            surface.set_config(config.scroll);
        }
        self.cursor.quad.set_config(config.cursor);
        self.cursor.vfx = CursorVfx::from_config(&config.cursor);
        self.config = config;
    }

    #[must_use]
    pub fn default_colors(&self) -> DefaultColors {
        self.default_colors
    }

    /// Highlight attributes for `id`; id 0 and unknown ids are the default.
    #[must_use]
    pub fn highlight(&self, id: u64) -> Option<&HlAttrs> {
        self.highlights.get(&id)
    }

    /// Colors for highlight `id` with defaults filled in and `reverse`
    /// applied.
    #[must_use]
    pub fn resolve_colors(&self, id: u64) -> ResolvedColors {
        let defaults = self.default_colors;
        let Some(attrs) = self.highlights.get(&id) else {
            return ResolvedColors {
                foreground: defaults.foreground,
                background: defaults.background,
                special: defaults.special,
            };
        };
        let foreground = attrs.foreground.unwrap_or(defaults.foreground);
        let background = attrs.background.unwrap_or(defaults.background);
        let (foreground, background) = if attrs.reverse {
            (background, foreground)
        } else {
            (foreground, background)
        };
        ResolvedColors {
            foreground,
            background,
            special: attrs.special.unwrap_or(defaults.special),
        }
    }

    /// Text style bits for highlight `id`.
    #[must_use]
    pub fn style_flags(&self, id: u64) -> CellFlags {
        self.highlights
            .get(&id)
            .map(CellFlags::from_attrs)
            .unwrap_or_default()
    }

    /// Active mode, when the editor enabled cursor styling.
    #[must_use]
    pub fn mode(&self) -> Option<&ModeInfo> {
        self.current_mode()
    }

    /// Blend snapshot for `grid`'s scroll region.
    #[must_use]
    pub fn blend_uniform(
        &self,
        grid: u64,
        screen: (f32, f32),
        padding_top: f32,
    ) -> Option<ScrollBlendUniform> {
        let surface = self.surfaces.get(&grid)?;
        Some(ScrollBlendUniform::new(
            surface.pixel_offset(self.cell.height),
            screen,
            self.cell.height,
            surface.scroll_rows(),
            padding_top,
        ))
    }
}

impl Animatable for Multigrid {
    fn animate(&mut self, dt: f32) -> bool {
        Multigrid::animate(self, dt)
    }

    fn next_wake(&self) -> Option<f32> {
        self.cursor.quad.next_blink_transition()
    }
}
