#![forbid(unsafe_code)]

//! Grid: per-window surfaces, the editor multigrid, and the scroll-blend
//! contract published to the GPU.
//!
//! # Role in glide
//! `glide-grid` is where discrete edits meet continuous motion. Decoded
//! events from `glide-protocol` mutate [`GridSurface`]s immediately; a flush
//! turns the accumulated scroll into spring retargets from `glide-core`,
//! and the render path reads interpolated offsets back out as
//! [`ScrollBlendUniform`] and [`PixelScrollUniform`] snapshots.
//!
//! # Primary responsibilities
//! - **GridSurface**: authoritative cells, scrollback ring, margins, scroll
//!   and position springs.
//! - **Multigrid**: event ingest queue, window placement and draw order, the
//!   editor cursor, highlight and mode tables.
//! - **Blend**: uniform layouts, the CPU reference blend, and the WGSL pass.
//! - **TerminalScroller**: rate-driven pixel scrolling for the primary
//!   terminal.

pub mod blend;
pub mod cell;
pub mod error;
pub mod multigrid;
pub mod surface;
pub mod terminal_scroll;

pub use blend::{FramePair, PixelScrollUniform, ScrollBlendUniform, blend_row_sample};
pub use cell::{Cell, CellFlags};
pub use error::{GridError, Result};
pub use multigrid::{DrainReport, EditorCursor, IngestSender, Multigrid};
pub use surface::{GridSurface, ScrollRegion, SurfaceKind, ViewportMargins};
pub use terminal_scroll::TerminalScroller;
