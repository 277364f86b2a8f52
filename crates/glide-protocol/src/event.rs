#![forbid(unsafe_code)]

//! Decoded editor UI events.
//!
//! These mirror the editor's multigrid redraw notifications after the
//! transport layer has decoded them. Grid ids are the editor's; grid 1 is
//! the root grid. Every event that targets a grid carries its id in a
//! `grid` field so [`UiEvent::grid`] can route without matching.
//!
//! Events serialize as internally tagged JSON, which is how recorded
//! sessions are stored:
//!
//! ```json
//! {"kind":"grid_scroll","grid":2,"top":0,"bottom":40,"left":0,"right":80,"rows":3,"cols":0}
//! ```

use serde::{Deserialize, Serialize};

/// Packed `0xRRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Split into `(r, g, b)` bytes.
    #[must_use]
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

/// One run of cells in a `grid_line` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLineCell {
    /// Cell text, usually one grapheme. Empty for the right half of a wide
    /// character.
    pub text: String,
    /// Highlight id; `None` reuses the previous cell's id in the same event.
    #[serde(default)]
    pub hl_id: Option<u64>,
    /// Number of consecutive cells with this content.
    #[serde(default = "one")]
    pub repeat: u32,
}

fn one() -> u32 {
    1
}

impl GridLineCell {
    /// A single cell.
    #[must_use]
    pub fn new(text: impl Into<String>, hl_id: Option<u64>) -> Self {
        Self {
            text: text.into(),
            hl_id,
            repeat: 1,
        }
    }

    /// `repeat` copies of a cell.
    #[must_use]
    pub fn repeated(text: impl Into<String>, hl_id: Option<u64>, repeat: u32) -> Self {
        Self {
            text: text.into(),
            hl_id,
            repeat,
        }
    }
}

/// Cursor shape named by a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeCursorShape {
    #[default]
    Block,
    Horizontal,
    Vertical,
}

/// Cursor style for one editor mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeInfo {
    pub name: String,
    pub cursor_shape: ModeCursorShape,
    /// Bar thickness in percent of the cell, for non-block shapes.
    pub cell_percentage: u32,
    /// Milliseconds before the first blink; zero disables blinking.
    pub blinkwait: u64,
    pub blinkon: u64,
    pub blinkoff: u64,
    /// Highlight id of the cursor itself.
    pub attr_id: Option<u64>,
}

/// Highlight attributes for one `hl_attr_define` id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HlAttrs {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    pub special: Option<Rgb>,
    pub reverse: bool,
    pub italic: bool,
    pub bold: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub undercurl: bool,
    /// Background transparency for floating windows, 0..=100.
    pub blend: u8,
}

/// A decoded UI event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiEvent {
    /// Create or resize a grid.
    GridResize { grid: u64, width: u32, height: u32 },

    /// Write a run of cells starting at `col_start`.
    GridLine {
        grid: u64,
        row: u32,
        col_start: u32,
        cells: Vec<GridLineCell>,
    },

    /// Blank the whole grid.
    GridClear { grid: u64 },

    /// Shift the region `[top, bottom) × [left, right)` up by `rows`
    /// (negative: down). `cols` is always zero in current editors.
    GridScroll {
        grid: u64,
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
        rows: i32,
        #[serde(default)]
        cols: i32,
    },

    /// Move the cursor to `(row, col)` of `grid`.
    GridCursorGoto { grid: u64, row: u32, col: u32 },

    /// The grid is gone for good.
    GridDestroy { grid: u64 },

    /// Place an anchored window at a cell position of the root grid.
    WinPos {
        grid: u64,
        start_row: u32,
        start_col: u32,
        width: u32,
        height: u32,
    },

    /// Place a floating window. Position is in root-grid cells and may be
    /// fractional.
    WinFloatPosition {
        grid: u64,
        row: f32,
        col: f32,
        z_index: u32,
    },

    /// Visible buffer range of a window. A non-zero `scroll_delta` is the
    /// editor's authoritative count of lines scrolled since the last
    /// viewport event.
    WinViewport {
        grid: u64,
        topline: u64,
        botline: u64,
        #[serde(default)]
        scroll_delta: i64,
    },

    /// Rows and columns fixed at the window edges (winbar, borders).
    WinViewportMargins {
        grid: u64,
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
    },

    /// Stop drawing the window but keep its state.
    WinHide { grid: u64 },

    /// Close the window and drop its grid.
    WinClose { grid: u64 },

    /// Cursor styles for every mode.
    ModeInfoSet {
        cursor_style_enabled: bool,
        modes: Vec<ModeInfo>,
    },

    /// Switch to mode `index` of the last `mode_info_set`.
    ModeChange { mode: String, index: usize },

    /// Colors for highlight id 0 and unset attributes.
    DefaultColorsSet {
        foreground: Rgb,
        background: Rgb,
        special: Rgb,
    },

    /// Define highlight id `id`.
    HlAttrDefine { id: u64, attrs: HlAttrs },

    /// The batch is complete; commit it.
    Flush,
}

impl UiEvent {
    /// Grid this event targets, if any.
    #[must_use]
    pub fn grid(&self) -> Option<u64> {
        match self {
            Self::GridResize { grid, .. }
            | Self::GridLine { grid, .. }
            | Self::GridClear { grid }
            | Self::GridScroll { grid, .. }
            | Self::GridCursorGoto { grid, .. }
            | Self::GridDestroy { grid }
            | Self::WinPos { grid, .. }
            | Self::WinFloatPosition { grid, .. }
            | Self::WinViewport { grid, .. }
            | Self::WinViewportMargins { grid, .. }
            | Self::WinHide { grid }
            | Self::WinClose { grid } => Some(*grid),
            Self::ModeInfoSet { .. }
            | Self::ModeChange { .. }
            | Self::DefaultColorsSet { .. }
            | Self::HlAttrDefine { .. }
            | Self::Flush => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GridResize { .. } => "grid_resize",
            Self::GridLine { .. } => "grid_line",
            Self::GridClear { .. } => "grid_clear",
            Self::GridScroll { .. } => "grid_scroll",
            Self::GridCursorGoto { .. } => "grid_cursor_goto",
            Self::GridDestroy { .. } => "grid_destroy",
            Self::WinPos { .. } => "win_pos",
            Self::WinFloatPosition { .. } => "win_float_pos",
            Self::WinViewport { .. } => "win_viewport",
            Self::WinViewportMargins { .. } => "win_viewport_margins",
            Self::WinHide { .. } => "win_hide",
            Self::WinClose { .. } => "win_close",
            Self::ModeInfoSet { .. } => "mode_info_set",
            Self::ModeChange { .. } => "mode_change",
            Self::DefaultColorsSet { .. } => "default_colors_set",
            Self::HlAttrDefine { .. } => "hl_attr_define",
            Self::Flush => "flush",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_routing() {
        assert_eq!(UiEvent::GridClear { grid: 4 }.grid(), Some(4));
        assert_eq!(UiEvent::Flush.grid(), None);
        assert_eq!(
            UiEvent::WinViewport {
                grid: 2,
                topline: 0,
                botline: 10,
                scroll_delta: 1
            }
            .grid(),
            Some(2)
        );
    }

    #[test]
    fn rgb_channels() {
        assert_eq!(Rgb(0x12_34_56).channels(), (0x12, 0x34, 0x56));
    }

    #[test]
    fn decodes_tagged_json() {
        let event: UiEvent = serde_json::from_str(
            r#"{"kind":"grid_line","grid":1,"row":3,"col_start":0,
                "cells":[{"text":"a","hl_id":7},{"text":" ","repeat":4}]}"#,
        )
        .unwrap();
        let UiEvent::GridLine { cells, .. } = event else {
            panic!("expected grid_line");
        };
        assert_eq!(cells[0], GridLineCell::new("a", Some(7)));
        assert_eq!(cells[1], GridLineCell::repeated(" ", None, 4));
    }

    #[test]
    fn viewport_delta_defaults_to_zero() {
        let event: UiEvent = serde_json::from_str(
            r#"{"kind":"win_viewport","grid":2,"topline":5,"botline":30}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            UiEvent::WinViewport {
                grid: 2,
                topline: 5,
                botline: 30,
                scroll_delta: 0
            }
        );
    }

    #[test]
    fn mode_info_defaults() {
        let event: UiEvent = serde_json::from_str(
            r#"{"kind":"mode_info_set","cursor_style_enabled":true,
                "modes":[{"name":"insert","cursor_shape":"vertical","cell_percentage":25}]}"#,
        )
        .unwrap();
        let UiEvent::ModeInfoSet { modes, .. } = event else {
            panic!("expected mode_info_set");
        };
        assert_eq!(modes[0].cursor_shape, ModeCursorShape::Vertical);
        assert_eq!(modes[0].blinkwait, 0);
    }
}
