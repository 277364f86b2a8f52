#![forbid(unsafe_code)]

//! Cross-frame scroll blending, as handed to the GPU.
//!
//! During a scroll animation the renderer keeps two committed frames. Rows
//! inside the scroll region sample the previous frame shifted by the scroll
//! offset; once the offset drops below half a cell they cross-fade to the
//! current frame, reaching it exactly at zero offset. Rows outside the
//! region always show the current frame so winbars and status lines stay
//! put.
//!
//! [`ScrollBlendUniform`] is the per-frame uniform block; its layout matches
//! the `ScrollBlend` struct in [`SCROLL_BLEND_WGSL`]. [`blend_row_sample`] is
//! the same function on the CPU, used by software fallbacks and tests.

use bytemuck::{Pod, Zeroable};

/// Weight of the current frame for a given scroll offset.
///
/// Zero while `|offset| >= cell_height / 2`, then rising linearly to one at
/// zero offset.
#[must_use]
pub fn current_frame_weight(offset_pixels: f32, cell_height: f32) -> f32 {
    let half = cell_height * 0.5;
    if !half.is_finite() || half <= 0.0 || !offset_pixels.is_finite() {
        return 1.0;
    }
    let distance = offset_pixels.abs();
    if distance >= half {
        0.0
    } else {
        1.0 - distance / half
    }
}

/// Uniform block for the scroll-blend pass. All lengths are pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ScrollBlendUniform {
    /// Current-frame weight in `[0, 1]`.
    pub blend_factor: f32,
    pub scroll_offset_pixels: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub cell_height: f32,
    /// First pixel row of the scroll region, relative to the grid origin.
    pub scroll_region_top: f32,
    /// Pixel row just past the scroll region.
    pub scroll_region_bottom: f32,
    pub padding_top: f32,
}

impl ScrollBlendUniform {
    /// Build the snapshot for one frame.
    ///
    /// `region_rows` is the scroll region in grid rows; it is converted to
    /// pixels here so the shader never needs the cell grid.
    #[must_use]
    pub fn new(
        scroll_offset_pixels: f32,
        screen: (f32, f32),
        cell_height: f32,
        region_rows: (u32, u32),
        padding_top: f32,
    ) -> Self {
        Self {
            blend_factor: current_frame_weight(scroll_offset_pixels, cell_height),
            scroll_offset_pixels,
            screen_width: screen.0,
            screen_height: screen.1,
            cell_height,
            scroll_region_top: region_rows.0 as f32 * cell_height,
            scroll_region_bottom: region_rows.1 as f32 * cell_height,
            padding_top,
        }
    }

    /// Whether pixel row `y` (grid-relative) is inside the scroll region.
    #[must_use]
    pub fn in_region(&self, y: f32) -> bool {
        y >= self.scroll_region_top && y < self.scroll_region_bottom
    }

    /// Raw bytes for a buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Y offset shared by the background and glyph passes of the primary
/// terminal. Always a whole number of pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PixelScrollUniform {
    pub y_offset: f32,
    _pad: [f32; 3],
}

impl PixelScrollUniform {
    /// Round `offset_pixels` to the nearest whole pixel.
    #[must_use]
    pub fn new(offset_pixels: f32) -> Self {
        let y_offset = if offset_pixels.is_finite() {
            offset_pixels.round()
        } else {
            0.0
        };
        Self {
            y_offset,
            _pad: [0.0; 3],
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Previous and current committed render targets.
#[derive(Debug, Clone, Default)]
pub struct FramePair<T> {
    previous: T,
    current: T,
}

impl<T> FramePair<T> {
    pub fn new(previous: T, current: T) -> Self {
        Self { previous, current }
    }

    #[must_use]
    pub fn previous(&self) -> &T {
        &self.previous
    }

    #[must_use]
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Target to render the next frame into.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    /// Promote the current frame to previous. The old previous target is
    /// recycled as the new current one.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
    }
}

fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// Color at screen pixel row `y` for one column, given samplers over both
/// frames. Mirrors [`SCROLL_BLEND_WGSL`]: the region test runs on the
/// grid-relative row `y - padding_top`.
#[must_use]
pub fn blend_row_sample(
    uniform: &ScrollBlendUniform,
    y: f32,
    previous: impl Fn(f32) -> [f32; 4],
    current: impl Fn(f32) -> [f32; 4],
) -> [f32; 4] {
    if !uniform.in_region(y - uniform.padding_top) {
        return current(y);
    }
    let now = current(y);
    if uniform.blend_factor >= 1.0 {
        return now;
    }
    let before = previous(y + uniform.scroll_offset_pixels);
    mix(before, now, uniform.blend_factor)
}

/// WGSL for the blend pass. Binding 0 of group 0 is [`ScrollBlendUniform`].
pub const SCROLL_BLEND_WGSL: &str = r"
struct ScrollBlend {
    blend_factor: f32,
    scroll_offset_pixels: f32,
    screen_width: f32,
    screen_height: f32,
    cell_height: f32,
    scroll_region_top: f32,
    scroll_region_bottom: f32,
    padding_top: f32,
};

@group(0) @binding(0) var<uniform> blend: ScrollBlend;
@group(0) @binding(1) var previous_frame: texture_2d<f32>;
@group(0) @binding(2) var current_frame: texture_2d<f32>;
@group(0) @binding(3) var frame_sampler: sampler;

@fragment
fn fs_main(@builtin(position) pos: vec4<f32>) -> @location(0) vec4<f32> {
    let size = vec2<f32>(blend.screen_width, blend.screen_height);
    let uv = pos.xy / size;
    let now = textureSample(current_frame, frame_sampler, uv);
    let y = pos.y - blend.padding_top;
    if (y < blend.scroll_region_top || y >= blend.scroll_region_bottom) {
        return now;
    }
    let shifted = vec2<f32>(pos.x, pos.y + blend.scroll_offset_pixels) / size;
    let before = textureSample(previous_frame, frame_sampler, shifted);
    return mix(before, now, blend.blend_factor);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    fn uniform(offset: f32) -> ScrollBlendUniform {
        ScrollBlendUniform::new(offset, (800.0, 600.0), 20.0, (1, 20), 0.0)
    }

    #[test]
    fn weight_curve() {
        assert_eq!(current_frame_weight(40.0, 20.0), 0.0);
        assert_eq!(current_frame_weight(-10.0, 20.0), 0.0);
        assert_eq!(current_frame_weight(5.0, 20.0), 0.5);
        assert_eq!(current_frame_weight(0.0, 20.0), 1.0);
        assert_eq!(current_frame_weight(3.0, 0.0), 1.0);
    }

    #[test]
    fn uniform_is_eight_floats() {
        assert_eq!(std::mem::size_of::<ScrollBlendUniform>(), 32);
        assert_eq!(uniform(0.0).as_bytes().len(), 32);
        assert_eq!(std::mem::size_of::<PixelScrollUniform>(), 16);
    }

    #[test]
    fn region_is_in_pixels() {
        let u = uniform(0.0);
        assert_eq!(u.scroll_region_top, 20.0);
        assert_eq!(u.scroll_region_bottom, 400.0);
        assert!(!u.in_region(19.9));
        assert!(u.in_region(20.0));
        assert!(!u.in_region(400.0));
    }

    #[test]
    fn padding_shifts_region_on_screen_only() {
        let padded = ScrollBlendUniform::new(-30.0, (800.0, 600.0), 20.0, (1, 20), 8.0);
        // Stored region stays grid-relative.
        assert_eq!(padded.scroll_region_top, 20.0);
        assert_eq!(padded.scroll_region_bottom, 400.0);
        // Screen row 25 is grid row 17 px: above the region.
        assert_eq!(blend_row_sample(&padded, 25.0, |_| RED, |_| BLUE), BLUE);
        // Screen row 30 is grid row 22 px: inside, so the previous frame shows.
        assert_eq!(blend_row_sample(&padded, 30.0, |_| RED, |_| BLUE), RED);
        assert_eq!(blend_row_sample(&padded, 407.0, |_| RED, |_| BLUE), RED);
        assert_eq!(blend_row_sample(&padded, 408.0, |_| RED, |_| BLUE), BLUE);
    }

    #[test]
    fn outside_region_shows_current() {
        let u = uniform(-30.0);
        let color = blend_row_sample(&u, 5.0, |_| RED, |_| BLUE);
        assert_eq!(color, BLUE);
    }

    #[test]
    fn large_offset_shows_shifted_previous() {
        let u = uniform(-30.0);
        let color = blend_row_sample(
            &u,
            100.0,
            |y| if y == 70.0 { RED } else { BLUE },
            |_| BLUE,
        );
        assert_eq!(color, RED);
    }

    #[test]
    fn small_offset_cross_fades() {
        let u = uniform(5.0);
        let color = blend_row_sample(&u, 100.0, |_| RED, |_| BLUE);
        assert_eq!(color, [0.5, 0.0, 0.5, 1.0]);
        let settled = blend_row_sample(&uniform(0.0), 100.0, |_| RED, |_| BLUE);
        assert_eq!(settled, BLUE);
    }

    #[test]
    fn pixel_uniform_rounds() {
        assert_eq!(PixelScrollUniform::new(-12.6).y_offset, -13.0);
        assert_eq!(PixelScrollUniform::new(3.4).y_offset, 3.0);
        assert_eq!(PixelScrollUniform::new(f32::NAN).y_offset, 0.0);
    }

    #[test]
    fn frame_pair_swaps() {
        let mut frames = FramePair::new(1, 2);
        *frames.current_mut() = 3;
        frames.commit();
        assert_eq!(*frames.previous(), 3);
        assert_eq!(*frames.current(), 1);
    }

    #[test]
    fn shader_declares_every_field() {
        for field in [
            "blend_factor",
            "scroll_offset_pixels",
            "scroll_region_top",
            "scroll_region_bottom",
            "padding_top",
        ] {
            assert!(SCROLL_BLEND_WGSL.contains(field), "missing {field}");
        }
    }
}
