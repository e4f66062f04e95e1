//! Error types for block deinterlacing.
//!
//! `process` has exactly two failure modes, both detected before the output
//! frame is touched. Everything else (a missing previous field, clipped edge
//! blocks, odd picture sizes) is a recognized input shape with its own
//! fallback path and never surfaces as an error.

use thiserror::Error;

/// Error returned by [`process`](crate::process) and
/// [`process_woven`](crate::process_woven).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeinterlaceError {
    /// No deinterlace context was supplied.
    #[error("Invalid context: no deinterlace context supplied")]
    InvalidContext,

    /// The row range does not start on an 8-row block boundary.
    #[error("Start row {start_row} is not a multiple of 8")]
    StartRowUnaligned { start_row: u32 },
}

/// Result type for deinterlacing operations.
pub type Result<T> = std::result::Result<T, DeinterlaceError>;

impl DeinterlaceError {
    /// Create a start row alignment error.
    pub fn start_row_unaligned(start_row: u32) -> Self {
        Self::StartRowUnaligned { start_row }
    }
}

/// Error raised while building a plane view over a caller buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Stride is smaller than the row width.
    #[error("Stride {stride} is smaller than width {width}")]
    StrideTooSmall { stride: usize, width: usize },

    /// Buffer cannot hold the described rows.
    #[error("Buffer too small: need {needed} bytes, have {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
}

impl LayoutError {
    /// Create a buffer size error.
    pub fn buffer_too_small(needed: usize, actual: usize) -> Self {
        Self::BufferTooSmall { needed, actual }
    }
}
