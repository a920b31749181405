//! Grid-subsystem error type.

use thiserror::Error;

/// Errors produced by `crowd-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    /// A tile lookup outside `[0, width) × [0, height)`.  Always a logic
    /// defect in the caller; the tick loop treats it as fatal.
    #[error("tile ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("map parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for the map size")]
    PixelBuffer { expected: usize, actual: usize },

    #[error("grid must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },
}

pub type GridResult<T> = Result<T, GridError>;
