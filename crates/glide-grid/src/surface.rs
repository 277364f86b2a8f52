#![forbid(unsafe_code)]

//! One editor window: authoritative cells plus the springs that animate
//! them.
//!
//! Cell writes are applied immediately and are always what the editor last
//! sent. Scrolling is split in two. [`GridSurface::handle_scroll`] moves the
//! cells and accumulates the line count; [`GridSurface::commit`] turns the
//! accumulated count into a scroll-spring retarget. Between commits the
//! renderer keeps drawing the settled picture.
//!
//! # Scrollback ring
//!
//! The ring holds `2 × height` line buffers. Logical lines `[0, rows)` mirror
//! the scroll region after each commit; negative lines hold content that
//! scrolled off the top and lines past the region hold content that scrolled
//! off the bottom. A commit of `d` lines rotates the ring by `-d`, so the
//! lines still on screen mid-animation are found without copying.
//!
//! ```text
//!  logical  -2  -1 │ 0   1   2   3 │  4   5
//!           old    │ region rows   │  old
//!           above  │ (live copy)   │  below
//! ```
//!
//! # Invariants
//!
//! 1. `cells.len() == width × height` at all times.
//! 2. Scrollback capacity is exactly `2 × height` after every resize.
//! 3. `handle_scroll(region, r)` then `handle_scroll(region, -r)` restores
//!    the region, because rows pushed out of a region are stashed and used
//!    to refill rows exposed by the opposite scroll.
//! 4. After a commit the scroll spring owes at most
//!    `min(max_visual_offset, height)` lines.
//!
//! # Failure Modes
//!
//! - Allocation failure in [`GridSurface::resize`]: reported as
//!   [`GridError::Allocation`]; the surface keeps its previous contents.
//! - Out-of-range writes and scroll regions: clamped or ignored.

use std::collections::{TryReserveError, VecDeque};

use glide_core::config::ScrollConfig;
use glide_core::{Animatable, Point, RingIndex, Size, SpringAxis};
use glide_protocol::GridLineCell;

use crate::cell::Cell;
use crate::error::{GridError, Result};

/// Rectangle of cells participating in a scroll, `[top, bottom) × [left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollRegion {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl ScrollRegion {
    /// Region covering whole rows `[top, bottom)` of a `width`-wide grid.
    #[must_use]
    pub const fn rows(top: u32, bottom: u32, width: u32) -> Self {
        Self {
            top,
            bottom,
            left: 0,
            right: width,
        }
    }

    fn clamped(self, width: u32, height: u32) -> Option<Self> {
        let clamped = Self {
            top: self.top,
            bottom: self.bottom.min(height),
            left: self.left,
            right: self.right.min(width),
        };
        (clamped.top < clamped.bottom && clamped.left < clamped.right).then_some(clamped)
    }
}

/// Rows and columns pinned at the window edges (winbar, borders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// How a window is placed relative to the root grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    /// The root grid, always drawn first.
    #[default]
    Root,
    /// Tiled window placed by `win_pos`.
    Anchored,
    /// Floating window; higher `z_index` draws later.
    Floating { z_index: u32 },
}

/// One line to draw mid-scroll.
#[derive(Debug, Clone, Copy)]
pub struct RenderLine<'a> {
    /// Vertical position in rows from the top of the grid. Fractional while
    /// the scroll spring is moving; may fall outside the scroll region.
    pub row: f32,
    pub cells: &'a [Cell],
}

/// Per-window grid state.
#[derive(Debug, Clone)]
pub struct GridSurface {
    id: u64,
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    scrollback: RingIndex<Box<[Cell]>>,
    // Rows pushed out of `stash_region`; the back is nearest the edge.
    stash_above: VecDeque<Box<[Cell]>>,
    stash_below: VecDeque<Box<[Cell]>>,
    stash_region: Option<ScrollRegion>,
    margins: ViewportMargins,
    scroll_spring: SpringAxis,
    pending_scroll_delta: i64,
    viewport: (u64, u64),
    // Target position in root-grid cells, and the springs owing the rest.
    position: Option<Point>,
    position_x: SpringAxis,
    position_y: SpringAxis,
    kind: SurfaceKind,
    sequence: u64,
    hidden: bool,
    dirty: bool,
    config: ScrollConfig,
}

fn try_blank_row(width: usize) -> std::result::Result<Box<[Cell]>, TryReserveError> {
    let mut row = Vec::new();
    row.try_reserve_exact(width)?;
    row.resize(width, Cell::blank());
    Ok(row.into_boxed_slice())
}

impl GridSurface {
    /// An empty `0×0` surface. Call [`resize`](Self::resize) before use.
    #[must_use]
    pub fn new(id: u64, config: ScrollConfig) -> Self {
        Self {
            id,
            width: 0,
            height: 0,
            cells: Vec::new(),
            scrollback: RingIndex::from_fn(0, |_| Box::default()),
            stash_above: VecDeque::new(),
            stash_below: VecDeque::new(),
            stash_region: None,
            margins: ViewportMargins::default(),
            scroll_spring: SpringAxis::new(),
            pending_scroll_delta: 0,
            viewport: (0, 0),
            position: None,
            position_x: SpringAxis::new(),
            position_y: SpringAxis::new(),
            kind: SurfaceKind::Root,
            sequence: 0,
            hidden: false,
            dirty: false,
            config,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace the scroll tuning. Springs in flight keep their state.
    pub fn set_config(&mut self, config: ScrollConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Sizing
    // -----------------------------------------------------------------------

    /// Reallocate for `width × height` cells.
    ///
    /// Contents that still fit are kept. Springs, the pending delta and the
    /// scroll stash are reset. On failure nothing changes.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let w = usize::try_from(width).map_err(|_| GridError::DimensionOverflow)?;
        let h = usize::try_from(height).map_err(|_| GridError::DimensionOverflow)?;
        let total = w.checked_mul(h).ok_or(GridError::DimensionOverflow)?;
        let ring_capacity = h.checked_mul(2).ok_or(GridError::DimensionOverflow)?;
        let alloc_error = |_: TryReserveError| GridError::Allocation { width, height };

        let mut cells = Vec::new();
        cells.try_reserve_exact(total).map_err(alloc_error)?;
        let scrollback = RingIndex::try_from_fn(ring_capacity, |_| try_blank_row(w))
            .map_err(alloc_error)?;

        let old_w = self.width as usize;
        let old_h = self.height as usize;
        for row in 0..h {
            for col in 0..w {
                let cell = if row < old_h && col < old_w {
                    self.cells[row * old_w + col].clone()
                } else {
                    Cell::blank()
                };
                cells.push(cell);
            }
        }

        self.width = width;
        self.height = height;
        self.cells = cells;
        self.scrollback = scrollback;
        self.reset_stash();
        self.scroll_spring.reset();
        self.position_x.reset();
        self.position_y.reset();
        self.pending_scroll_delta = 0;
        self.sync_scrollback();
        self.dirty = true;

        tracing::debug!(grid = self.id, width, height, "grid resized");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    fn index(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.height && col < self.width)
            .then(|| row as usize * self.width as usize + col as usize)
    }

    /// Cell at `(row, col)`, or `None` out of range.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// Whole row, or `None` out of range.
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&[Cell]> {
        (row < self.height).then(|| {
            let w = self.width as usize;
            let start = row as usize * w;
            &self.cells[start..start + w]
        })
    }

    /// Row text with one string per cell concatenated. Empty out of range.
    #[must_use]
    pub fn row_text(&self, row: u32) -> String {
        self.row(row)
            .map(|cells| cells.iter().map(Cell::text).collect())
            .unwrap_or_default()
    }

    /// Write one cell. Out-of-range coordinates are ignored.
    pub fn set_cell(&mut self, row: u32, col: u32, text: &str, hl_id: u64) {
        if let Some(i) = self.index(row, col) {
            self.cells[i].set(text, hl_id);
            self.dirty = true;
        }
    }

    /// Apply a `grid_line` run starting at `col_start`.
    ///
    /// A cell without a highlight id reuses the previous one in this run
    /// (0 at the start). Cells past the right edge are dropped.
    pub fn draw_line(&mut self, row: u32, col_start: u32, cells: &[GridLineCell]) {
        if row >= self.height {
            return;
        }
        let mut col = col_start;
        let mut hl_id = 0;
        'cells: for cell in cells {
            if let Some(id) = cell.hl_id {
                hl_id = id;
            }
            for _ in 0..cell.repeat {
                if col >= self.width {
                    break 'cells;
                }
                self.set_cell(row, col, &cell.text, hl_id);
                col += 1;
            }
        }
    }

    /// Blank every cell. Springs keep moving; the stash is dropped.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.reset_stash();
        self.dirty = true;
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    fn reset_stash(&mut self) {
        self.stash_above.clear();
        self.stash_below.clear();
        self.stash_region = None;
    }

    fn segment(&self, row: usize, region: &ScrollRegion) -> Box<[Cell]> {
        let start = row * self.width as usize;
        self.cells[start + region.left as usize..start + region.right as usize].into()
    }

    fn fill_segment(&mut self, row: usize, region: &ScrollRegion, source: Option<Box<[Cell]>>) {
        let start = row * self.width as usize;
        let target = &mut self.cells[start + region.left as usize..start + region.right as usize];
        match source {
            Some(saved) => target.clone_from_slice(&saved),
            None => target.iter_mut().for_each(Cell::clear),
        }
    }

    fn push_stash(stash: &mut VecDeque<Box<[Cell]>>, row: Box<[Cell]>, bound: usize) {
        stash.push_back(row);
        while stash.len() > bound {
            stash.pop_front();
        }
    }

    /// Shift the cells of `region` by `rows` lines; positive moves content
    /// up. `rows` is added to the pending delta for the next commit.
    pub fn handle_scroll(&mut self, region: ScrollRegion, rows: i32) {
        if rows == 0 {
            return;
        }
        let Some(region) = region.clamped(self.width, self.height) else {
            tracing::debug!(grid = self.id, ?region, "ignoring empty scroll region");
            return;
        };
        if self.stash_region != Some(region) {
            self.stash_above.clear();
            self.stash_below.clear();
            self.stash_region = Some(region);
        }

        let w = self.width as usize;
        let (top, bottom) = (region.top as usize, region.bottom as usize);
        let (left, right) = (region.left as usize, region.right as usize);
        let n = (rows.unsigned_abs() as usize).min(bottom - top);
        let bound = self.height as usize;

        if rows > 0 {
            for row in top..top + n {
                let saved = self.segment(row, &region);
                Self::push_stash(&mut self.stash_above, saved, bound);
            }
            for row in top..bottom - n {
                let (head, tail) = self.cells.split_at_mut((row + n) * w);
                head[row * w + left..row * w + right].clone_from_slice(&tail[left..right]);
            }
            for row in bottom - n..bottom {
                let restored = self.stash_below.pop_back();
                self.fill_segment(row, &region, restored);
            }
        } else {
            for row in (bottom - n..bottom).rev() {
                let saved = self.segment(row, &region);
                Self::push_stash(&mut self.stash_below, saved, bound);
            }
            for row in (top + n..bottom).rev() {
                let (head, tail) = self.cells.split_at_mut(row * w);
                let src = (row - n) * w;
                tail[left..right].clone_from_slice(&head[src + left..src + right]);
            }
            for row in (top..top + n).rev() {
                let restored = self.stash_above.pop_back();
                self.fill_segment(row, &region, restored);
            }
        }

        self.pending_scroll_delta = self.pending_scroll_delta.saturating_add(i64::from(rows));
        self.dirty = true;
    }

    /// Record a `win_viewport` report. A non-zero `scroll_delta` replaces
    /// whatever `grid_scroll` accumulated since the last commit.
    pub fn set_viewport(&mut self, topline: u64, botline: u64, scroll_delta: i64) {
        self.viewport = (topline, botline);
        if scroll_delta != 0 {
            self.pending_scroll_delta = scroll_delta;
        }
    }

    /// Buffer line range last reported by `win_viewport`.
    #[must_use]
    pub fn viewport(&self) -> (u64, u64) {
        self.viewport
    }

    /// Lines scrolled since the last commit.
    #[must_use]
    pub fn pending_scroll_delta(&self) -> i64 {
        self.pending_scroll_delta
    }

    /// Rows `[top, bottom)` that scroll; margin rows are excluded.
    #[must_use]
    pub fn scroll_rows(&self) -> (u32, u32) {
        let top = self.margins.top.min(self.height);
        let bottom = self.height.saturating_sub(self.margins.bottom).max(top);
        (top, bottom)
    }

    fn sync_scrollback(&mut self) {
        let (top, bottom) = self.scroll_rows();
        let w = self.width as usize;
        for (logical, row) in (top..bottom).enumerate() {
            let start = row as usize * w;
            let source = &self.cells[start..start + w];
            // Logical indices stay far below isize::MAX: the ring holds 2×height lines.
            if let Some(slot) = self.scrollback.get_mut(logical as isize) {
                slot.clone_from_slice(source);
            }
        }
    }

    /// Turn the pending delta into a scroll-spring retarget.
    ///
    /// Returns whether the spring now needs ticks.
    pub fn commit(&mut self) -> bool {
        let delta = std::mem::take(&mut self.pending_scroll_delta);
        if delta != 0 {
            let rows = self.scroll_rows();
            let span = i64::from(rows.1 - rows.0);
            // Rotations beyond the ring are equivalent modulo its capacity.
            let rotation = delta.clamp(-2 * span.max(1), 2 * span.max(1));
            self.scrollback.rotate(-(rotation as isize));

            let bound = self.config.max_visual_offset.min(self.height as f32);
            self.scroll_spring.shift(-(delta as f32));
            self.scroll_spring.clamp_position(bound);
            tracing::trace!(
                grid = self.id,
                delta,
                offset = self.scroll_spring.position(),
                "scroll committed"
            );
        }
        self.sync_scrollback();
        !self.scroll_spring.is_settled()
    }

    /// Scroll spring offset in lines; zero at rest.
    #[must_use]
    pub fn scroll_position(&self) -> f32 {
        self.scroll_spring.position()
    }

    /// Scroll offset in pixels.
    #[must_use]
    pub fn pixel_offset(&self, cell_height: f32) -> f32 {
        self.scroll_spring.position() * cell_height
    }

    /// Whole lines of the scroll offset, rounded toward negative infinity.
    #[must_use]
    pub fn offset_whole_lines(&self) -> i64 {
        self.scroll_spring.position().floor() as i64
    }

    /// The scrollback ring.
    #[must_use]
    pub fn scrollback(&self) -> &RingIndex<Box<[Cell]>> {
        &self.scrollback
    }

    /// Lines to draw inside the scroll region, including the extra line
    /// exposed by a fractional offset.
    pub fn render_lines(&self) -> impl Iterator<Item = RenderLine<'_>> + '_ {
        let (top, bottom) = self.scroll_rows();
        let position = self.scroll_spring.position();
        let first = self.offset_whole_lines();
        let count = i64::from(bottom - top);
        (first..=first + count).filter_map(move |logical| {
            let cells = self.scrollback.get(logical as isize)?;
            Some(RenderLine {
                row: top as f32 + (logical as f32 - position),
                cells,
            })
        })
    }

    /// Margin rows, which never scroll.
    pub fn margin_rows(&self) -> impl Iterator<Item = (u32, &[Cell])> + '_ {
        let (top, bottom) = self.scroll_rows();
        (0..top)
            .chain(bottom..self.height)
            .filter_map(|row| self.row(row).map(|cells| (row, cells)))
    }

    #[must_use]
    pub fn margins(&self) -> ViewportMargins {
        self.margins
    }

    /// Pin rows and columns at the edges. The ring mirror is refreshed at the
    /// next commit.
    pub fn set_margins(&mut self, margins: ViewportMargins) {
        if self.margins != margins {
            self.margins = margins;
            self.reset_stash();
            self.dirty = true;
        }
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: SurfaceKind) {
        self.kind = kind;
    }

    /// Creation order, used to break z-order ties.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Move the window to `(row, col)` root-grid cells.
    ///
    /// The first placement snaps. Later ones animate from the rendered
    /// position.
    pub fn set_position(&mut self, row: f32, col: f32) {
        let target = Point::new(col, row);
        if let Some(rendered) = self.rendered_cell_position() {
            self.position_x.retarget(rendered.x - target.x);
            self.position_y.retarget(rendered.y - target.y);
        }
        self.position = Some(target);
    }

    /// Target position in root-grid cells (`x` = column, `y` = row).
    #[must_use]
    pub fn target_position(&self) -> Option<Point> {
        self.position
    }

    /// Current animated position in root-grid cells.
    #[must_use]
    pub fn rendered_cell_position(&self) -> Option<Point> {
        self.position.map(|target| {
            Point::new(
                target.x + self.position_x.position(),
                target.y + self.position_y.position(),
            )
        })
    }

    /// Current animated position in pixels. Unplaced windows sit at the
    /// origin.
    #[must_use]
    pub fn pixel_position(&self, cell: Size) -> Point {
        let at = self.rendered_cell_position().unwrap_or(Point::ZERO);
        Point::new(at.x * cell.width, at.y * cell.height)
    }

    // -----------------------------------------------------------------------
    // Animation
    // -----------------------------------------------------------------------

    /// Advance every spring. Returns whether any is still moving.
    pub fn animate(&mut self, dt: f32) -> bool {
        let scrolling = self
            .scroll_spring
            .advance(dt, self.config.animation_length);

        let threshold = self.config.position_snap_threshold;
        let length = self.config.position_animation_length;
        let mut moving = false;
        for axis in [&mut self.position_x, &mut self.position_y] {
            if axis.position().abs() > threshold {
                axis.reset();
            } else {
                moving |= axis.advance(dt, length);
            }
        }
        scrolling || moving
    }

    /// Whether every spring is at rest.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.scroll_spring.is_settled() && self.position_x.is_settled() && self.position_y.is_settled()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Animatable for GridSurface {
    fn animate(&mut self, dt: f32) -> bool {
        GridSurface::animate(self, dt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
