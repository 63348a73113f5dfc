//! Byte-exact size accounting for VTF image data.
//!
//! The container body is fully determined by the format, base resolution,
//! mipmap count and frame count, so its size is known before any pixel is
//! encoded. [`data_size`] computes it; [`solve_resolution_for_budget`] runs
//! the search in the other direction, from a byte budget to a resolution.
//!
//! # Example
//!
//! ```
//! use spraykit::format::PixelFormat;
//! use spraykit::size::{data_size, max_mipmaps};
//!
//! // 64×64 DXT1A: 16×16 blocks of 8 bytes
//! assert_eq!(data_size(PixelFormat::Dxt1A, 64, 64, 1, 1), 2048);
//! assert_eq!(max_mipmaps(256, 1), 9);
//! ```

mod budget;

pub use budget::{solve_resolution_for_budget, ResolutionConstraints, MAX_RESOLUTION};

use crate::format::PixelFormat;
use crate::vtf::HEADER_SIZE;

/// Dimension of mip level `level` for a base dimension, never below one.
#[inline]
pub fn mip_dimension(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

/// Number of mip levels down to 1×1, including the base level.
///
/// `max_mipmaps(1, 1) == 1`, `max_mipmaps(256, 1) == 9`. A zero-sized image
/// has one level.
pub fn max_mipmaps(width: u32, height: u32) -> u32 {
    let longest = width.max(height);
    if longest == 0 {
        1
    } else {
        32 - longest.leading_zeros()
    }
}

/// Size in bytes of `frames` frames of a `mipmaps`-level chain.
///
/// Block formats round every level up to whole 4×4 blocks. A zero width or
/// height describes no image and has size zero.
pub fn data_size(format: PixelFormat, width: u32, height: u32, mipmaps: u32, frames: u32) -> u64 {
    if width == 0 || height == 0 {
        return 0;
    }

    let bytes_per_block = u64::from(format.bytes_per_block());
    let bytes_per_pixel = u64::from(format.bytes_per_pixel());

    let per_frame: u64 = (0..mipmaps)
        .map(|level| {
            let w = u64::from(mip_dimension(width, level));
            let h = u64::from(mip_dimension(height, level));
            if format.is_block_compressed() {
                w.div_ceil(4) * h.div_ceil(4) * bytes_per_block
            } else {
                w * h * bytes_per_pixel
            }
        })
        .sum();

    per_frame * u64::from(frames)
}

/// Size of a single mip level of a single frame.
pub fn level_size(format: PixelFormat, width: u32, height: u32, level: u32) -> u64 {
    let w = mip_dimension(width, level);
    let h = mip_dimension(height, level);
    data_size(format, w, h, 1, 1)
}

/// Total file size: the fixed header followed by the image data.
pub fn file_size(format: PixelFormat, width: u32, height: u32, mipmaps: u32, frames: u32) -> u64 {
    HEADER_SIZE as u64 + data_size(format, width, height, mipmaps, frames)
}
