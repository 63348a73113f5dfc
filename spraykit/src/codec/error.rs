//! Error types for pixel conversion.

use thiserror::Error;

use crate::format::PixelFormat;

/// Errors that can occur while converting pixels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The format has no decoder channel layout. Indicates a catalog fault.
    #[error("No source channel layout for {0}; this should never happen")]
    InvalidSourceLayout(PixelFormat),

    /// The format cannot be produced by the pixel codec.
    #[error("Pixel conversion to {0} is not supported")]
    UnsupportedFormat(PixelFormat),

    /// Fewer source bytes than `count` RGBA pixels.
    #[error("Source buffer too small: need {needed} bytes, got {actual}")]
    SourceTooShort { needed: usize, actual: usize },
}
