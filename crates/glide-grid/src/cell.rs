#![forbid(unsafe_code)]

//! Grid cell: one column of one row in a window.
//!
//! A cell stores its grapheme inline (most are a single `char`), the
//! editor's highlight id, and width flags. Colors are resolved through the
//! multigrid's highlight table at draw time, so cells stay small and
//! cloning a line never touches the heap for ordinary text.

use bitflags::bitflags;
use smallvec::SmallVec;
use unicode_width::UnicodeWidthStr;

use glide_protocol::HlAttrs;

bitflags! {
    /// Per-cell layout and style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u16 {
        /// Leading half of a double-width grapheme.
        const WIDE          = 1 << 0;
        /// Trailing half of a double-width grapheme; draws nothing.
        const CONTINUATION  = 1 << 1;
        const BOLD          = 1 << 2;
        const ITALIC        = 1 << 3;
        const UNDERLINE     = 1 << 4;
        const UNDERCURL     = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
        const REVERSE       = 1 << 7;
    }
}

impl CellFlags {
    /// Style bits implied by a highlight definition.
    #[must_use]
    pub fn from_attrs(attrs: &HlAttrs) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::BOLD, attrs.bold);
        flags.set(Self::ITALIC, attrs.italic);
        flags.set(Self::UNDERLINE, attrs.underline);
        flags.set(Self::UNDERCURL, attrs.undercurl);
        flags.set(Self::STRIKETHROUGH, attrs.strikethrough);
        flags.set(Self::REVERSE, attrs.reverse);
        flags
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: SmallVec<[char; 2]>,
    /// Highlight id; 0 is the default highlight.
    pub hl_id: u64,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl Cell {
    /// A space with the default highlight.
    #[must_use]
    pub fn blank() -> Self {
        let mut text = SmallVec::new();
        text.push(' ');
        Self {
            text,
            hl_id: 0,
            flags: CellFlags::empty(),
        }
    }

    /// A cell showing `text` with highlight `hl_id`.
    #[must_use]
    pub fn new(text: &str, hl_id: u64) -> Self {
        let mut cell = Self::blank();
        cell.set(text, hl_id);
        cell
    }

    /// Replace content. An empty string marks the right half of a wide
    /// grapheme.
    pub fn set(&mut self, text: &str, hl_id: u64) {
        self.text.clear();
        self.text.extend(text.chars());
        self.hl_id = hl_id;
        self.flags.remove(CellFlags::WIDE | CellFlags::CONTINUATION);
        if text.is_empty() {
            self.flags.insert(CellFlags::CONTINUATION);
        } else if text.width() > 1 {
            self.flags.insert(CellFlags::WIDE);
        }
    }

    /// Reset to a blank space.
    pub fn clear(&mut self) {
        self.set(" ", 0);
        self.flags = CellFlags::empty();
    }

    /// The grapheme as a string.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// The grapheme's code points.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.text
    }

    /// Whether this cell draws nothing but background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.flags.contains(CellFlags::CONTINUATION)
            || self.text.iter().all(|c| c.is_whitespace())
    }
}
