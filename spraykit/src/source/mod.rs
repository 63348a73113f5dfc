//! Source images: decoded frames, loading, and composition to a mip target.
//!
//! Loading is behind the [`ImageLoader`] trait so jobs can be fed from any
//! decoder. [`FileImageLoader`] reads still images and GIF, APNG and WebP
//! animations through the `image` crate.
//!
//! ```text
//!   file ──► ImageLoader ──► Vec<RasterFrame>
//!                               │
//!                               ▼  per mip, per frame
//!          crop ──► fit_and_letterbox ──► flatten_alpha ──► codec
//! ```

mod compose;
mod frame;
mod loader;

pub use compose::{fit_and_letterbox, fit_dimensions, flatten_alpha};
pub use frame::RasterFrame;
pub use loader::FileImageLoader;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from loading or constructing frames.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} contains no frames", path.display())]
    NoFrames { path: PathBuf },

    #[error("Invalid frame {width}×{height} with {len} bytes of pixels")]
    InvalidFrame { width: u32, height: u32, len: usize },
}

/// Decodes a file into one or more RGBA8 frames of equal size.
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<RasterFrame>, LoadError>;
}
