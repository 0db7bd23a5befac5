//! Error types for camfilter.

use thiserror::Error;

/// Result alias for camfilter operations.
pub type Result<T> = std::result::Result<T, CamFilterError>;

/// Errors that can occur while capturing, filtering, or displaying frames.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CamFilterError {
    /// Width or height is zero or overflows the address space.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// A pixel buffer is shorter than its declared geometry.
    #[error("buffer too small: needed {needed} pixels, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two frames that must share a geometry do not.
    #[error(
        "geometry mismatch: expected {expected_width}x{expected_height}, got {width}x{height}"
    )]
    GeometryMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// A row index past the bottom of the frame.
    #[error("row {row} out of bounds for height {height}")]
    RowOutOfBounds { row: usize, height: usize },
    /// A pixel coordinate outside the frame.
    #[error("pixel ({x}, {y}) out of bounds for {width}x{height}")]
    PixelOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// The frame source did not signal completion within the bounded wait.
    #[error("capture of row {row} timed out after {timeout_ms} ms")]
    CaptureTimeout { row: usize, timeout_ms: u64 },
    /// The pipeline stopped after a fatal capture failure.
    #[error("pipeline halted after a capture failure")]
    Halted,
    /// Writing to a display transport failed.
    #[error("io error: {reason}")]
    Io { reason: String },
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
