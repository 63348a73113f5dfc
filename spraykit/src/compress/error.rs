//! Error types for block compression.

use thiserror::Error;

use crate::format::PixelFormat;

/// Errors that can occur during block compression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressError {
    /// Width or height is zero.
    #[error("Invalid dimensions {width}×{height} for block compression")]
    InvalidDimensions { width: u32, height: u32 },

    /// The compressor does not produce this format.
    #[error("Block compression to {0} is not supported")]
    UnsupportedFormat(PixelFormat),

    /// Pixel buffer smaller than `width * height * 4`.
    #[error("Pixel buffer too small: need {needed} bytes, got {actual}")]
    SourceTooShort { needed: usize, actual: usize },

    /// The codec or its thread pool failed.
    #[error("Compression failed: {0}")]
    Failed(String),
}
