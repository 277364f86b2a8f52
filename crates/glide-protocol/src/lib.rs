#![forbid(unsafe_code)]

//! Protocol: the inputs that drive glide.
//!
//! - [`event`]: decoded editor UI events consumed by the multigrid.
//! - [`scroll_sequence`]: the terminal engine's private scroll report.
//! - [`key_notation`]: key and mouse input rendered as editor notation.
//!
//! Nothing here performs I/O. Transport and message decoding happen in the
//! collaborators that produce these values.

pub mod event;
pub mod key_notation;
pub mod scroll_sequence;

pub use event::{GridLineCell, HlAttrs, ModeCursorShape, ModeInfo, Rgb, UiEvent};
pub use key_notation::{
    KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseInput, WheelDirection,
    key_notation, mouse_notation,
};
pub use scroll_sequence::{ScrollCommand, ScrollSequenceError};
