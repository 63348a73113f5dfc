//! Block compression for the DXT formats.
//!
//! The container writer talks to block compression only through the
//! [`BlockCompressor`] trait, so the codec can be swapped (or stubbed in
//! tests) without touching the writer.
//!
//! ```text
//! ┌─────────────────────┐
//! │   ContainerWriter   │
//! │                     │
//! │ Arc<dyn BlockCompressor>
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   BlockCompressor   │ (trait)
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ IntelBlockCompressor│  intel_tex_2 BC1/BC3 kernels,
//! │                     │  punch-through and explicit alpha
//! └─────────────────────┘  blocks built on top
//! ```
//!
//! # Example
//!
//! ```
//! use spraykit::compress::{BlockCompressor, IntelBlockCompressor};
//! use spraykit::format::PixelFormat;
//!
//! let compressor = IntelBlockCompressor::new();
//! let pixels = vec![255u8; 8 * 8 * 4];
//! let blocks = compressor
//!     .compress(&pixels, 8, 8, PixelFormat::Dxt1, 0, &mut |_| {})
//!     .unwrap();
//! assert_eq!(blocks.len(), 4 * 8);
//! ```

mod blocks;
mod error;
mod intel;

pub use error::CompressError;
pub use intel::IntelBlockCompressor;

use crate::format::PixelFormat;

/// Upper bound on helper threads a compressor may use.
pub const MAX_HELPER_THREADS: usize = 16;

/// Default helper thread count: the machine's parallelism, kept within
/// `4..=MAX_HELPER_THREADS`.
pub fn default_helper_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(4, MAX_HELPER_THREADS)
}

/// Compresses RGBA8 pixels into 4×4 blocks.
///
/// Implementations must return exactly
/// `ceil(width/4) * ceil(height/4) * format.bytes_per_block()` bytes, blocks
/// in row-major order. `progress` receives a non-decreasing percentage
/// (0-100) on the calling thread, zero or more times.
pub trait BlockCompressor: Send + Sync {
    fn compress(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        helper_threads: usize,
        progress: &mut dyn FnMut(u32),
    ) -> Result<Vec<u8>, CompressError>;

    /// Short human-readable name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_helper_threads_in_range() {
        let n = default_helper_threads();
        assert!((4..=MAX_HELPER_THREADS).contains(&n));
    }
}
