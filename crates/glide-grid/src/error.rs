#![forbid(unsafe_code)]

//! Errors surfaced by grid surfaces.

/// Recoverable grid failures. The surface keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cannot allocate a {width}x{height} grid")]
    Allocation { width: u32, height: u32 },

    #[error("grid dimensions overflow the address space")]
    DimensionOverflow,
}

/// Result alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
