//! Property-based invariant tests for `GridSurface`.
//!
//! 1. After any resize, writes never land outside `width × height`
//! 2. Scrollback capacity is exactly `2 × height` after every resize
//! 3. Scrolling a region by `+r` then `-r` restores it
//! 4. A commit never leaves more than `max_visual_offset` lines owed
//! 5. Scrolling never touches cells outside the region

use glide_core::config::ScrollConfig;
use glide_grid::{GridSurface, ScrollRegion};
use proptest::prelude::*;

fn surface(width: u32, height: u32) -> GridSurface {
    let mut s = GridSurface::new(1, ScrollConfig::default());
    s.resize(width, height).unwrap();
    s
}

/// Fill every cell with a letter derived from its coordinates.
fn patterned(width: u32, height: u32) -> GridSurface {
    let mut s = surface(width, height);
    for row in 0..height {
        for col in 0..width {
            let c = char::from(b'a' + ((row * 7 + col * 3) % 26) as u8);
            s.set_cell(row, col, &c.to_string(), u64::from(row));
        }
    }
    s
}

fn snapshot(s: &GridSurface) -> Vec<String> {
    (0..s.height()).map(|row| s.row_text(row)).collect()
}

fn region_strategy() -> impl Strategy<Value = (u32, u32, ScrollRegion)> {
    (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
        (0..h, 0..w).prop_flat_map(move |(top, left)| {
            (top + 1..=h, left + 1..=w).prop_map(move |(bottom, right)| {
                (
                    w,
                    h,
                    ScrollRegion {
                        top,
                        bottom,
                        left,
                        right,
                    },
                )
            })
        })
    })
}

// ═════════════════════════════════════════════════════════════════════════
// Sizing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_bounds_writes(
        sizes in prop::collection::vec((0u32..40, 0u32..40), 1..6),
        writes in prop::collection::vec((0u32..80, 0u32..80), 0..50),
    ) {
        let mut s = GridSurface::new(1, ScrollConfig::default());
        for (w, h) in sizes {
            s.resize(w, h).unwrap();
            prop_assert_eq!(s.scrollback().capacity(), 2 * h as usize);
        }
        for (row, col) in writes {
            s.set_cell(row, col, "x", 1);
            let inside = row < s.height() && col < s.width();
            prop_assert_eq!(s.cell(row, col).is_some(), inside);
        }
        prop_assert!(s.row(s.height()).is_none());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Scrolling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scroll_round_trip((w, h, region) in region_strategy(), rows in 1i32..30) {
        let mut s = patterned(w, h);
        let before = snapshot(&s);
        s.handle_scroll(region, rows);
        s.handle_scroll(region, -rows);
        prop_assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn reverse_round_trip((w, h, region) in region_strategy(), rows in 1i32..30) {
        let mut s = patterned(w, h);
        let before = snapshot(&s);
        s.handle_scroll(region, -rows);
        s.handle_scroll(region, rows);
        prop_assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn scroll_leaves_outside_untouched((w, h, region) in region_strategy(), rows in -30i32..30) {
        let mut s = patterned(w, h);
        let before = patterned(w, h);
        s.handle_scroll(region, rows);
        for row in 0..h {
            for col in 0..w {
                let inside = row >= region.top
                    && row < region.bottom
                    && col >= region.left
                    && col < region.right;
                if !inside {
                    prop_assert_eq!(s.cell(row, col), before.cell(row, col));
                }
            }
        }
    }

    #[test]
    fn commit_bounds_visual_offset(
        h in 1u32..40,
        scrolls in prop::collection::vec(-50i32..50, 1..10),
        max_visual_offset in 0.5f32..8.0,
    ) {
        let config = ScrollConfig { max_visual_offset, ..ScrollConfig::default() };
        let mut s = GridSurface::new(1, config);
        s.resize(4, h).unwrap();
        for rows in scrolls {
            s.handle_scroll(ScrollRegion::rows(0, h, 4), rows);
            s.commit();
            let bound = max_visual_offset.min(h as f32);
            prop_assert!(s.scroll_position().abs() <= bound);
            prop_assert_eq!(s.pending_scroll_delta(), 0);
            s.animate(1.0 / 60.0);
        }
    }
}
