#![forbid(unsafe_code)]

//! Cursor rendered as four independently sprung corners.
//!
//! Each corner keeps a fixed relative offset in `[-0.5, 0.5]²` and a pair of
//! [`SpringAxis`] holding its distance from the corner's target. Targets are
//! always `center + relative × quad size`; only the springs carry motion.
//!
//! When the destination moves, corners facing the direction of travel get a
//! shorter animation length than the ones facing away, so the quad stretches
//! into a trail and contracts as it lands:
//!
//! ```text
//!   travel →          leading corners: base · (1 - trail_size)
//!   ┌──────────┐      middle corners:  average of the two
//!   │        ┌─┼─┐    trailing corner: base
//!   └────────┼─┘ │
//!            └───┘
//! ```
//!
//! Short typing-sized moves skip the trail and use one short length for all
//! corners. Moving to another grid always snaps.

use super::blink::{BlinkPhase, BlinkTimings, CursorBlink};
use super::spring::SpringAxis;
use crate::config::CursorConfig;
use crate::geometry::{Point, Size};

/// Corner offsets relative to the quad center, in quad sizes.
const CORNER_OFFSETS: [Point; 4] = [
    Point::new(-0.5, -0.5), // top-left
    Point::new(0.5, -0.5),  // top-right
    Point::new(0.5, 0.5),   // bottom-right
    Point::new(-0.5, 0.5),  // bottom-left
];

/// Cursor shape as reported by the editor's mode info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Full cell.
    #[default]
    Block,
    /// Bar on the left edge, `cell_percentage` of the cell width.
    Vertical,
    /// Bar on the bottom edge, `cell_percentage` of the cell height.
    Horizontal,
}

/// Where the cursor should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTarget {
    /// Grid the cursor lives in.
    pub grid: u64,
    /// Pixel position of the cursor cell's top-left corner.
    pub origin: Point,
    /// Cell size in pixels.
    pub cell: Size,
    pub shape: CursorShape,
    /// Bar thickness for non-block shapes, in `(0, 1]`.
    pub cell_percentage: f32,
}

impl CursorTarget {
    /// Block cursor at `origin`.
    #[must_use]
    pub fn block(grid: u64, origin: Point, cell: Size) -> Self {
        Self {
            grid,
            origin,
            cell,
            shape: CursorShape::Block,
            cell_percentage: 1.0,
        }
    }

    /// Quad center and size for this shape.
    fn rect(&self) -> (Point, Size) {
        let pct = if self.cell_percentage.is_finite() {
            self.cell_percentage.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let size = match self.shape {
            CursorShape::Block => self.cell,
            CursorShape::Vertical => Size::new(self.cell.width * pct, self.cell.height),
            CursorShape::Horizontal => Size::new(self.cell.width, self.cell.height * pct),
        };
        let top_left = match self.shape {
            CursorShape::Horizontal => {
                Point::new(self.origin.x, self.origin.y + self.cell.height - size.height)
            }
            CursorShape::Block | CursorShape::Vertical => self.origin,
        };
        let center = top_left + Point::new(size.width * 0.5, size.height * 0.5);
        (center, size)
    }
}

/// How [`CursorQuadAnimator::update`] handled a new destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorMove {
    /// Same destination as before.
    Unchanged,
    /// Teleported: first placement or a different grid.
    Snapped,
    /// Adjacent-cell motion with a uniform short animation.
    ShortJump,
    /// Trailing motion along `travel` (pixels, rendered center to new center).
    Jump { travel: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    relative: Point,
    x: SpringAxis,
    y: SpringAxis,
    animation_length: f32,
}

impl Corner {
    fn new(relative: Point) -> Self {
        Self {
            relative,
            x: SpringAxis::new(),
            y: SpringAxis::new(),
            animation_length: 0.0,
        }
    }

    fn target(&self, center: Point, size: Size) -> Point {
        center + self.relative.scale(size)
    }

    fn offset(&self) -> Point {
        Point::new(self.x.position(), self.y.position())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Destination {
    grid: u64,
    center: Point,
    size: Size,
}

/// Four-corner cursor animator with blink.
#[derive(Debug, Clone)]
pub struct CursorQuadAnimator {
    corners: [Corner; 4],
    destination: Option<Destination>,
    config: CursorConfig,
    blink: CursorBlink,
}

impl CursorQuadAnimator {
    /// Create an unplaced cursor. Blinking is off until timings are set.
    #[must_use]
    pub fn new(config: CursorConfig) -> Self {
        Self {
            corners: CORNER_OFFSETS.map(Corner::new),
            destination: None,
            config,
            blink: CursorBlink::new(BlinkTimings::default(), config.blink_smoothing),
        }
    }

    /// Replace the tuning. Takes effect on the next move.
    pub fn set_config(&mut self, config: CursorConfig) {
        self.config = config;
    }

    /// Blink timings from the active mode.
    pub fn set_blink_timings(&mut self, timings: BlinkTimings) {
        self.blink.set_timings(timings);
    }

    /// Whether the cursor has been placed.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.destination.is_some()
    }

    /// Grid of the current destination.
    #[must_use]
    pub fn grid(&self) -> Option<u64> {
        self.destination.map(|d| d.grid)
    }

    /// Move toward `target`.
    pub fn update(&mut self, target: CursorTarget) -> CursorMove {
        let (center, size) = target.rect();
        let next = Destination {
            grid: target.grid,
            center,
            size,
        };

        let Some(previous) = self.destination else {
            self.snap_to(next);
            return CursorMove::Snapped;
        };
        if previous == next {
            return CursorMove::Unchanged;
        }
        self.blink.reset();
        if previous.grid != next.grid {
            tracing::trace!(from = previous.grid, to = next.grid, "cursor changed grid");
            self.snap_to(next);
            return CursorMove::Snapped;
        }

        let travel = center - self.rendered_center();
        for corner in &mut self.corners {
            let rendered = corner.target(previous.center, previous.size) + corner.offset();
            let remaining = rendered - corner.target(center, size);
            corner.x.retarget(remaining.x);
            corner.y.retarget(remaining.y);
        }
        self.destination = Some(next);

        let base = self.config.animation_length;
        let short = travel.x.abs() <= self.config.short_jump_cols * target.cell.width
            && travel.y.abs() <= self.config.short_jump_rows * target.cell.height;
        if short {
            let length = base.min(self.config.short_animation_length);
            for corner in &mut self.corners {
                corner.animation_length = length;
            }
            return CursorMove::ShortJump;
        }

        self.assign_trail_lengths(travel);
        CursorMove::Jump { travel }
    }

    fn snap_to(&mut self, destination: Destination) {
        for corner in &mut self.corners {
            corner.x.reset();
            corner.y.reset();
            corner.animation_length = 0.0;
        }
        self.destination = Some(destination);
        self.blink.reset();
    }

    fn assign_trail_lengths(&mut self, travel: Point) {
        let base = self.config.animation_length;
        let leading = base * (1.0 - self.config.trail_size.clamp(0.0, 1.0));
        let middle = (leading + base) * 0.5;

        let direction = travel.normalize_or_zero();
        let alignment = self
            .corners
            .map(|c| direction.dot(c.relative.normalize_or_zero()));

        for (i, corner) in self.corners.iter_mut().enumerate() {
            let rank = alignment.iter().filter(|&&a| a < alignment[i]).count();
            corner.animation_length = match rank {
                0 => base,
                1 => middle,
                _ => leading,
            };
        }
    }

    /// Advance springs and blink. Returns whether another frame is needed.
    pub fn animate(&mut self, dt: f32) -> bool {
        let mut moving = false;
        for corner in &mut self.corners {
            moving |= corner.x.advance(dt, corner.animation_length);
            moving |= corner.y.advance(dt, corner.animation_length);
        }
        let fading = self.blink.tick(dt);
        moving || fading
    }

    /// Rendered corner positions: top-left, top-right, bottom-right,
    /// bottom-left. All zero before the first placement.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        match self.destination {
            Some(d) => self.corners.map(|c| c.target(d.center, d.size) + c.offset()),
            None => [Point::ZERO; 4],
        }
    }

    /// Mean of the rendered corners.
    #[must_use]
    pub fn rendered_center(&self) -> Point {
        let sum = self
            .corners()
            .into_iter()
            .fold(Point::ZERO, |acc, p| acc + p);
        sum * 0.25
    }

    /// Per-corner animation lengths from the last move.
    #[must_use]
    pub fn animation_lengths(&self) -> [f32; 4] {
        self.corners.map(|c| c.animation_length)
    }

    /// Whether every corner has reached its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.corners
            .iter()
            .all(|c| c.x.is_settled() && c.y.is_settled())
    }

    /// Blink opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.blink.opacity()
    }

    /// Seconds until the blink phase changes, if blinking.
    #[must_use]
    pub fn next_blink_transition(&self) -> Option<f32> {
        self.blink.next_transition_in()
    }

    #[must_use]
    pub fn blink_phase(&self) -> BlinkPhase {
        self.blink.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: Size = Size::new(10.0, 20.0);
    const DT: f32 = 1.0 / 60.0;

    fn animator() -> CursorQuadAnimator {
        CursorQuadAnimator::new(CursorConfig::default())
    }

    fn at(grid: u64, col: f32, row: f32) -> CursorTarget {
        CursorTarget::block(grid, Point::new(col * CELL.width, row * CELL.height), CELL)
    }

    fn settle(cursor: &mut CursorQuadAnimator) {
        let mut frames = 0;
        while cursor.animate(DT) {
            frames += 1;
            assert!(frames < 600, "cursor never settled");
        }
    }

    #[test]
    fn first_placement_snaps() {
        let mut cursor = animator();
        assert_eq!(cursor.update(at(1, 3.0, 2.0)), CursorMove::Snapped);
        let corners = cursor.corners();
        assert_eq!(corners[0], Point::new(30.0, 40.0));
        assert_eq!(corners[2], Point::new(40.0, 60.0));
        assert!(cursor.is_settled());
    }

    #[test]
    fn same_destination_is_unchanged() {
        let mut cursor = animator();
        cursor.update(at(1, 3.0, 2.0));
        assert_eq!(cursor.update(at(1, 3.0, 2.0)), CursorMove::Unchanged);
    }

    #[test]
    fn grid_change_snaps_without_animation() {
        let mut cursor = animator();
        cursor.update(at(1, 0.0, 0.0));
        assert_eq!(cursor.update(at(2, 40.0, 10.0)), CursorMove::Snapped);
        assert!(cursor.is_settled());
        assert_eq!(cursor.corners()[0], Point::new(400.0, 200.0));
        assert!(!cursor.animate(DT));
    }

    #[test]
    fn adjacent_cell_is_short_jump() {
        let mut cursor = animator();
        cursor.update(at(1, 3.0, 2.0));
        assert_eq!(cursor.update(at(1, 4.0, 2.0)), CursorMove::ShortJump);
        assert_eq!(cursor.animation_lengths(), [0.04; 4]);
        // All corners move together, so the quad keeps its size.
        cursor.animate(DT);
        let c = cursor.corners();
        assert!(((c[1].x - c[0].x) - CELL.width).abs() < 1e-4);
    }

    #[test]
    fn vertical_move_is_never_short_with_default_rows() {
        let mut cursor = animator();
        cursor.update(at(1, 3.0, 2.0));
        assert!(matches!(
            cursor.update(at(1, 3.0, 3.0)),
            CursorMove::Jump { .. }
        ));
    }

    #[test]
    fn horizontal_jump_leads_with_right_corners() {
        let mut cursor = animator();
        cursor.update(at(1, 0.0, 0.0));
        let travel = match cursor.update(at(1, 20.0, 0.0)) {
            CursorMove::Jump { travel } => travel,
            other => panic!("expected jump, got {other:?}"),
        };
        assert_eq!(travel, Point::new(200.0, 0.0));

        let leading = 0.15 * (1.0 - 0.7);
        let [tl, tr, br, bl] = cursor.animation_lengths();
        assert!((tr - leading).abs() < 1e-6);
        assert!((br - leading).abs() < 1e-6);
        assert!((tl - 0.15).abs() < 1e-6);
        assert!((bl - 0.15).abs() < 1e-6);

        // Mid-flight the quad is stretched along the travel axis.
        cursor.animate(DT);
        let c = cursor.corners();
        assert!(c[1].x - c[0].x > CELL.width);
    }

    #[test]
    fn diagonal_jump_ranks_three_tiers() {
        let mut cursor = animator();
        cursor.update(at(1, 0.0, 0.0));
        cursor.update(at(1, 20.0, 10.0));
        let leading = 0.15 * 0.3;
        let middle = (leading + 0.15) / 2.0;
        let [tl, tr, br, bl] = cursor.animation_lengths();
        assert!((br - leading).abs() < 1e-6);
        assert!((tr - middle).abs() < 1e-6);
        assert!((bl - middle).abs() < 1e-6);
        assert!((tl - 0.15).abs() < 1e-6);
    }

    #[test]
    fn zero_trail_moves_corners_together() {
        let mut cursor = CursorQuadAnimator::new(CursorConfig {
            trail_size: 0.0,
            ..CursorConfig::default()
        });
        cursor.update(at(1, 0.0, 0.0));
        cursor.update(at(1, 20.0, 5.0));
        assert_eq!(cursor.animation_lengths(), [0.15; 4]);
    }

    #[test]
    fn jump_settles_on_target() {
        let mut cursor = animator();
        cursor.update(at(1, 0.0, 0.0));
        cursor.update(at(1, 20.0, 5.0));
        assert!(!cursor.is_settled());
        settle(&mut cursor);
        let c = cursor.corners();
        assert!((c[0].x - 200.0).abs() < 0.05);
        assert!((c[0].y - 100.0).abs() < 0.05);
    }

    #[test]
    fn retarget_mid_flight_starts_from_rendered_position() {
        let mut cursor = animator();
        cursor.update(at(1, 0.0, 0.0));
        cursor.update(at(1, 20.0, 5.0));
        for _ in 0..3 {
            cursor.animate(DT);
        }
        let before = cursor.corners();
        cursor.update(at(1, 5.0, 9.0));
        let after = cursor.corners();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b.x - a.x).abs() < 1e-3 && (b.y - a.y).abs() < 1e-3);
        }
    }

    #[test]
    fn shapes_derive_quad_geometry() {
        let mut cursor = animator();
        cursor.update(CursorTarget {
            shape: CursorShape::Vertical,
            cell_percentage: 0.25,
            ..at(1, 1.0, 1.0)
        });
        let c = cursor.corners();
        assert_eq!(c[0], Point::new(10.0, 20.0));
        assert_eq!(c[2], Point::new(12.5, 40.0));

        let mut cursor = animator();
        cursor.update(CursorTarget {
            shape: CursorShape::Horizontal,
            cell_percentage: 0.1,
            ..at(1, 1.0, 1.0)
        });
        let c = cursor.corners();
        assert!((c[0].y - 38.0).abs() < 1e-4);
        assert_eq!(c[2], Point::new(20.0, 40.0));
    }

    #[test]
    fn move_resets_blink() {
        let mut cursor = animator();
        cursor.set_blink_timings(BlinkTimings::new(100, 100, 100));
        cursor.update(at(1, 0.0, 0.0));
        for _ in 0..9 {
            cursor.animate(DT);
        }
        assert_eq!(cursor.blink.phase(), BlinkPhase::Hidden);
        cursor.update(at(1, 1.0, 0.0));
        assert_eq!(cursor.blink.phase(), BlinkPhase::WaitingBeforeBlink);
        assert!(cursor.next_blink_transition().unwrap() > 0.09);
    }

    #[test]
    fn same_blink_timings_keep_phase() {
        let mut cursor = animator();
        cursor.set_blink_timings(BlinkTimings::new(100, 100, 100));
        cursor.update(at(1, 0.0, 0.0));
        for _ in 0..9 {
            cursor.animate(DT);
        }
        assert_eq!(cursor.blink_phase(), BlinkPhase::Hidden);
        cursor.set_blink_timings(BlinkTimings::new(100, 100, 100));
        assert_eq!(cursor.blink_phase(), BlinkPhase::Hidden);
        cursor.set_blink_timings(BlinkTimings::new(200, 100, 100));
        assert_eq!(cursor.blink_phase(), BlinkPhase::WaitingBeforeBlink);
    }
}
