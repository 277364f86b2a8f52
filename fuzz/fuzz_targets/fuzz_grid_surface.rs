#![no_main]

use arbitrary::Arbitrary;
use glide_core::config::ScrollConfig;
use glide_grid::{GridSurface, ScrollRegion};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Resize { width: u8, height: u8 },
    SetCell { row: u16, col: u16, ch: char, hl: u8 },
    Scroll { top: u8, bottom: u8, left: u8, right: u8, rows: i8 },
    Viewport { delta: i8 },
    Margins { top: u8, bottom: u8 },
    Commit,
    Animate { millis: u8 },
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let config = ScrollConfig::default();
    let mut surface = GridSurface::new(1, config);

    for op in ops {
        match op {
            Op::Resize { width, height } => {
                surface
                    .resize(u32::from(width % 64), u32::from(height % 48))
                    .expect("small resize succeeds");
                assert_eq!(
                    surface.scrollback().capacity(),
                    2 * surface.height() as usize
                );
                assert_eq!(surface.pending_scroll_delta(), 0);
            }
            Op::SetCell { row, col, ch, hl } => {
                surface.set_cell(u32::from(row), u32::from(col), &ch.to_string(), u64::from(hl));
            }
            Op::Scroll {
                top,
                bottom,
                left,
                right,
                rows,
            } => {
                let region = ScrollRegion {
                    top: top.into(),
                    bottom: bottom.into(),
                    left: left.into(),
                    right: right.into(),
                };
                surface.handle_scroll(region, rows.into());
            }
            Op::Viewport { delta } => surface.set_viewport(0, 0, delta.into()),
            Op::Margins { top, bottom } => {
                surface.set_margins(glide_grid::ViewportMargins {
                    top: u32::from(top % 8),
                    bottom: u32::from(bottom % 8),
                    ..Default::default()
                });
            }
            Op::Commit => {
                surface.commit();
                let bound = config.max_visual_offset.min(surface.height() as f32);
                assert!(surface.scroll_position().abs() <= bound);
            }
            Op::Animate { millis } => {
                surface.animate(f32::from(millis) / 1000.0);
                assert!(surface.scroll_position().is_finite());
            }
            Op::Clear => surface.clear(),
        }

        // Post-conditions that must always hold.
        let (top, bottom) = surface.scroll_rows();
        assert!(top <= bottom && bottom <= surface.height());
        assert!(surface.cell(surface.height(), 0).is_none());
        assert!(surface.render_lines().count() <= (bottom - top) as usize + 1);
    }
});
