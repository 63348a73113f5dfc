//! VTF 7.1 container output.
//!
//! A container is a 64-byte header followed by every image of the texture,
//! smallest mip level first:
//!
//! ```text
//! ┌────────────┬──────────────────────┬─────┬──────────────────────┐
//! │ header (64)│ mip n-1: frame 0..f  │ ... │ mip 0: frame 0..f    │
//! └────────────┴──────────────────────┴─────┴──────────────────────┘
//! ```
//!
//! Each image is either a row-major run of 4×4 blocks or a dense pixel array,
//! depending on the format. [`ContainerWriter`] prepares every source image
//! (crop, fit, letterbox, alpha fixup), encodes it and checks the result
//! against the precomputed file size.

mod error;
mod header;
mod progress;
mod writer;

pub use error::EncodeError;
pub use header::{VtfFlags, VtfHeader, HEADER_SIZE};
pub use progress::{EncodeProgress, EncodeStage, NoProgress};
pub use writer::ContainerWriter;
