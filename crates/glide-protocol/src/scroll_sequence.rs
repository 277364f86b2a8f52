#![forbid(unsafe_code)]

//! Private scroll control-sequence payload.
//!
//! The terminal engine reports scrolls it performed with a private-use
//! control sequence whose payload is semicolon-delimited `key=value`
//! fields:
//!
//! ```text
//! scroll=5;top=2;bot=20;grid=1
//! ```
//!
//! | Key | Type | Default | Meaning |
//! |-----|------|---------|---------|
//! | `scroll` | signed int | required | lines scrolled, positive = content up |
//! | `top` | uint | 0 | first row of the scroll region |
//! | `bot` | uint | 0 | end row (exclusive); 0 = full grid height |
//! | `grid` | uint | 1 | target grid |
//!
//! Parsing is all-or-nothing: a present field that fails to parse, or a
//! missing `scroll`, rejects the whole payload. Unknown keys are skipped so
//! newer engines can add fields. A repeated key keeps its last value.

/// Errors from [`ScrollCommand::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrollSequenceError {
    #[error("scroll payload has no `scroll` field")]
    MissingScroll,

    #[error("scroll payload field `{key}` has invalid value {value:?}")]
    InvalidField { key: String, value: String },

    #[error("scroll payload field {0:?} is not `key=value`")]
    MalformedField(String),
}

/// Default target grid when `grid=` is absent.
pub const DEFAULT_GRID: u64 = 1;

/// A decoded scroll report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    /// Lines scrolled; positive moves content up.
    pub delta: i32,
    pub top: u32,
    /// Exclusive end row; 0 means the full grid height.
    pub bot: u32,
    pub grid: u64,
}

impl ScrollCommand {
    /// Parse a payload such as `scroll=-3;grid=2`.
    pub fn parse(payload: &str) -> Result<Self, ScrollSequenceError> {
        let mut delta = None;
        let mut top = 0;
        let mut bot = 0;
        let mut grid = DEFAULT_GRID;

        for field in payload.split(';').filter(|f| !f.is_empty()) {
            let Some((key, value)) = field.split_once('=') else {
                return Err(ScrollSequenceError::MalformedField(field.to_owned()));
            };
            match key {
                "scroll" => delta = Some(parse_field(key, value)?),
                "top" => top = parse_field(key, value)?,
                "bot" => bot = parse_field(key, value)?,
                "grid" => grid = parse_field(key, value)?,
                _ => tracing::debug!(key, "ignoring unknown scroll payload field"),
            }
        }

        let delta = delta.ok_or(ScrollSequenceError::MissingScroll)?;
        Ok(Self {
            delta,
            top,
            bot,
            grid,
        })
    }

    /// Parse raw payload bytes; non-UTF-8 input is malformed.
    pub fn parse_bytes(payload: &[u8]) -> Result<Self, ScrollSequenceError> {
        let text = std::str::from_utf8(payload).map_err(|_| {
            ScrollSequenceError::MalformedField(String::from_utf8_lossy(payload).into_owned())
        })?;
        Self::parse(text)
    }

    /// Scroll region `[top, bottom)` clamped to a grid of `height` rows.
    /// `None` when the region is empty.
    #[must_use]
    pub fn region(&self, height: u32) -> Option<(u32, u32)> {
        let bottom = if self.bot == 0 {
            height
        } else {
            self.bot.min(height)
        };
        (self.top < bottom).then_some((self.top, bottom))
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ScrollSequenceError> {
    value
        .parse()
        .map_err(|_| ScrollSequenceError::InvalidField {
            key: key.to_owned(),
            value: value.to_owned(),
        })
}

impl std::str::FromStr for ScrollCommand {
    type Err = ScrollSequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
