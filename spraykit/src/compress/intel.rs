//! [`BlockCompressor`] backed by the `intel_tex_2` ISPC kernels.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use intel_tex_2::{bc1, bc3, RgbaSurface};
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::debug;

use super::blocks::{explicit_alpha, force_four_colour, punch_through, BlockPixels};
use super::{BlockCompressor, CompressError, MAX_HELPER_THREADS};
use crate::alpha::AlphaThreshold;
use crate::format::PixelFormat;

/// Block rows compressed between two progress reports.
const PROGRESS_STEPS: usize = 20;

/// DXT1, DXT1A, DXT3 and DXT5 compressor.
///
/// BC1 and BC3 come straight from the kernels. DXT1A re-encodes blocks with
/// transparent pixels in three-colour mode; DXT3 pairs the BC3 colour half
/// with explicit 4-bit alpha.
///
/// Helper threads live in a rayon pool that is built on first use and kept
/// for later calls with the same thread count. Clones share the pool.
#[derive(Debug, Clone, Default)]
pub struct IntelBlockCompressor {
    alpha_threshold: AlphaThreshold,
    pool: Arc<Mutex<Option<CachedPool>>>,
    pools_built: Arc<AtomicUsize>,
}

#[derive(Debug)]
struct CachedPool {
    threads: usize,
    pool: Arc<ThreadPool>,
}

impl IntelBlockCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alpha below which DXT1A pixels are stored transparent.
    ///
    /// The container writer hard-edges alpha before compressing, so this
    /// only changes the output for callers that pass graded alpha directly.
    pub fn with_alpha_threshold(mut self, threshold: AlphaThreshold) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    pub fn alpha_threshold(&self) -> AlphaThreshold {
        self.alpha_threshold
    }

    /// The pool for `threads` helpers, reusing the cached one when the count
    /// matches. `None` for zero threads.
    fn pool_for(&self, threads: usize) -> Result<Option<Arc<ThreadPool>>, CompressError> {
        if threads == 0 {
            return Ok(None);
        }

        let mut cached = self
            .pool
            .lock()
            .map_err(|_| CompressError::Failed("thread pool cache poisoned".to_string()))?;
        if let Some(entry) = cached.as_ref().filter(|entry| entry.threads == threads) {
            return Ok(Some(Arc::clone(&entry.pool)));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("spraykit-dxt-{}", i))
            .build()
            .map_err(|e| CompressError::Failed(e.to_string()))?;
        let pool = Arc::new(pool);
        self.pools_built.fetch_add(1, Ordering::Relaxed);
        debug!(threads, "Built compression thread pool");

        *cached = Some(CachedPool {
            threads,
            pool: Arc::clone(&pool),
        });
        Ok(Some(pool))
    }

    #[cfg(test)]
    pub(crate) fn pools_built(&self) -> usize {
        self.pools_built.load(Ordering::Relaxed)
    }
}

/// RGBA pixels padded to whole blocks by repeating the last column and row.
struct PaddedSurface {
    data: Vec<u8>,
    width: usize,
    blocks_x: usize,
    blocks_y: usize,
}

impl PaddedSurface {
    fn new(pixels: &[u8], width: usize, height: usize) -> Self {
        let blocks_x = width.div_ceil(4);
        let blocks_y = height.div_ceil(4);
        let padded_width = blocks_x * 4;
        let padded_height = blocks_y * 4;

        let data = if width == padded_width && height == padded_height {
            pixels[..width * height * 4].to_vec()
        } else {
            let mut padded = vec![0u8; padded_width * padded_height * 4];
            for y in 0..padded_height {
                for x in 0..padded_width {
                    let src = (y.min(height - 1) * width + x.min(width - 1)) * 4;
                    let dst = (y * padded_width + x) * 4;
                    padded[dst..dst + 4].copy_from_slice(&pixels[src..src + 4]);
                }
            }
            padded
        };

        Self {
            data,
            width: padded_width,
            blocks_x,
            blocks_y,
        }
    }

    /// The four pixel rows of block row `by`.
    fn strip(&self, by: usize) -> &[u8] {
        let row_bytes = self.width * 4;
        &self.data[by * 4 * row_bytes..(by + 1) * 4 * row_bytes]
    }

    fn block_pixels(strip: &[u8], width: usize, bx: usize) -> BlockPixels {
        let mut block = [[0u8; 4]; 16];
        for (i, px) in block.iter_mut().enumerate() {
            let (x, y) = (bx * 4 + i % 4, i / 4);
            let offset = (y * width + x) * 4;
            px.copy_from_slice(&strip[offset..offset + 4]);
        }
        block
    }
}

/// Compresses one block row into `out`.
fn compress_strip(
    surface: &PaddedSurface,
    by: usize,
    format: PixelFormat,
    threshold: AlphaThreshold,
    out: &mut [u8],
) {
    let strip = surface.strip(by);
    let rgba = RgbaSurface {
        data: strip,
        width: surface.width as u32,
        height: 4,
        stride: (surface.width * 4) as u32,
    };

    match format {
        PixelFormat::Dxt1 => {
            bc1::compress_blocks_into(&rgba, out);
            out.chunks_exact_mut(8).for_each(force_four_colour);
        }
        PixelFormat::Dxt1A => {
            bc1::compress_blocks_into(&rgba, out);
            for (bx, block) in out.chunks_exact_mut(8).enumerate() {
                let pixels = PaddedSurface::block_pixels(strip, surface.width, bx);
                punch_through(block, &pixels, threshold);
            }
        }
        PixelFormat::Dxt3 => {
            let mut bc3_row = vec![0u8; out.len()];
            bc3::compress_blocks_into(&rgba, &mut bc3_row);
            for (bx, (block, bc3_block)) in out
                .chunks_exact_mut(16)
                .zip(bc3_row.chunks_exact(16))
                .enumerate()
            {
                let pixels = PaddedSurface::block_pixels(strip, surface.width, bx);
                explicit_alpha(bc3_block, &pixels, block);
            }
        }
        _ => bc3::compress_blocks_into(&rgba, out),
    }
}

impl BlockCompressor for IntelBlockCompressor {
    fn compress(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
        helper_threads: usize,
        progress: &mut dyn FnMut(u32),
    ) -> Result<Vec<u8>, CompressError> {
        if !matches!(
            format,
            PixelFormat::Dxt1 | PixelFormat::Dxt1A | PixelFormat::Dxt3 | PixelFormat::Dxt5
        ) {
            return Err(CompressError::UnsupportedFormat(format));
        }
        if width == 0 || height == 0 {
            return Err(CompressError::InvalidDimensions { width, height });
        }
        let needed = width as usize * height as usize * 4;
        if pixels.len() < needed {
            return Err(CompressError::SourceTooShort {
                needed,
                actual: pixels.len(),
            });
        }

        let surface = PaddedSurface::new(pixels, width as usize, height as usize);
        let row_bytes = surface.blocks_x * format.bytes_per_block() as usize;
        let mut output = vec![0u8; row_bytes * surface.blocks_y];

        let threads = helper_threads.min(MAX_HELPER_THREADS);
        let pool = self.pool_for(threads)?;
        let threshold = self.alpha_threshold;

        debug!(
            width,
            height,
            format = %format,
            helper_threads = threads,
            "Compressing blocks"
        );

        let rows_per_batch = surface.blocks_y.div_ceil(PROGRESS_STEPS).max(1);
        let mut rows_done = 0;

        for batch in output.chunks_mut(row_bytes * rows_per_batch) {
            let first_row = rows_done;
            let compress_batch = |batch: &mut [u8]| match &pool {
                Some(pool) => pool.install(|| {
                    batch
                        .par_chunks_mut(row_bytes)
                        .enumerate()
                        .for_each(|(i, row)| {
                            compress_strip(&surface, first_row + i, format, threshold, row)
                        })
                }),
                None => batch
                    .chunks_mut(row_bytes)
                    .enumerate()
                    .for_each(|(i, row)| {
                        compress_strip(&surface, first_row + i, format, threshold, row)
                    }),
            };
            compress_batch(batch);

            rows_done += batch.len() / row_bytes;
            progress((rows_done * 100 / surface.blocks_y) as u32);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "intel_tex_2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
        px.repeat((width * height) as usize)
    }

    #[test]
    fn test_output_sizes() {
        let compressor = IntelBlockCompressor::new();
        let pixels = solid(10, 6, [80, 90, 100, 255]);
        let cases = [
            (PixelFormat::Dxt1, 3 * 2 * 8),
            (PixelFormat::Dxt1A, 3 * 2 * 8),
            (PixelFormat::Dxt3, 3 * 2 * 16),
            (PixelFormat::Dxt5, 3 * 2 * 16),
        ];
        for (format, expected) in cases {
            let out = compressor
                .compress(&pixels, 10, 6, format, 0, &mut |_| {})
                .unwrap();
            assert_eq!(out.len(), expected, "{format}");
        }
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let compressor = IntelBlockCompressor::new();
        let mut pixels = Vec::new();
        for y in 0..32u32 {
            for x in 0..32u32 {
                let alpha = if (x + y) % 7 == 0 { 0 } else { 255 };
                pixels.extend_from_slice(&[(x * 8) as u8, (y * 8) as u8, 64, alpha]);
            }
        }
        for format in [PixelFormat::Dxt1A, PixelFormat::Dxt5] {
            let a = compressor
                .compress(&pixels, 32, 32, format, 0, &mut |_| {})
                .unwrap();
            let b = compressor
                .compress(&pixels, 32, 32, format, 4, &mut |_| {})
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let compressor = IntelBlockCompressor::new();
        let pixels = solid(64, 64, [1, 2, 3, 255]);
        let mut seen = Vec::new();
        compressor
            .compress(&pixels, 64, 64, PixelFormat::Dxt1, 2, &mut |p| seen.push(p))
            .unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_dxt1_blocks_are_four_colour() {
        let compressor = IntelBlockCompressor::new();
        let pixels = solid(8, 8, [0, 0, 0, 255]);
        let out = compressor
            .compress(&pixels, 8, 8, PixelFormat::Dxt1, 0, &mut |_| {})
            .unwrap();
        for block in out.chunks_exact(8) {
            let c0 = u16::from_le_bytes([block[0], block[1]]);
            let c1 = u16::from_le_bytes([block[2], block[3]]);
            assert!(c0 > c1);
        }
    }

    #[test]
    fn test_dxt1a_transparent_block() {
        let compressor = IntelBlockCompressor::new();
        let pixels = solid(4, 4, [255, 0, 0, 0]);
        let out = compressor
            .compress(&pixels, 4, 4, PixelFormat::Dxt1A, 0, &mut |_| {})
            .unwrap();
        assert_eq!(out, vec![0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let compressor = IntelBlockCompressor::new();
        let err = compressor
            .compress(&[0; 64], 4, 4, PixelFormat::Rgba8888, 0, &mut |_| {})
            .unwrap_err();
        assert_eq!(err, CompressError::UnsupportedFormat(PixelFormat::Rgba8888));

        let err = compressor
            .compress(&[], 0, 4, PixelFormat::Dxt1, 0, &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, CompressError::InvalidDimensions { .. }));

        let err = compressor
            .compress(&[0; 8], 4, 4, PixelFormat::Dxt1, 0, &mut |_| {})
            .unwrap_err();
        assert_eq!(
            err,
            CompressError::SourceTooShort {
                needed: 64,
                actual: 8
            }
        );
    }

    #[test]
    fn test_thread_pool_is_reused() {
        let compressor = IntelBlockCompressor::new();
        let pixels = solid(16, 16, [50, 60, 70, 255]);
        for format in [PixelFormat::Dxt1, PixelFormat::Dxt5, PixelFormat::Dxt1] {
            compressor
                .compress(&pixels, 16, 16, format, 3, &mut |_| {})
                .unwrap();
        }
        assert_eq!(compressor.pools_built(), 1);

        // Clones share the cache; no pool for zero threads
        let clone = compressor.clone();
        clone
            .compress(&pixels, 16, 16, PixelFormat::Dxt3, 3, &mut |_| {})
            .unwrap();
        clone
            .compress(&pixels, 16, 16, PixelFormat::Dxt3, 0, &mut |_| {})
            .unwrap();
        assert_eq!(compressor.pools_built(), 1);

        // A different count replaces the cached pool
        compressor
            .compress(&pixels, 16, 16, PixelFormat::Dxt1, 2, &mut |_| {})
            .unwrap();
        assert_eq!(compressor.pools_built(), 2);
    }

    #[test]
    fn test_dxt1a_uses_configured_threshold() {
        let pixels = solid(4, 4, [255, 0, 0, 100]);

        let transparent = IntelBlockCompressor::new()
            .compress(&pixels, 4, 4, PixelFormat::Dxt1A, 0, &mut |_| {})
            .unwrap();
        assert_eq!(transparent, vec![0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);

        let opaque = IntelBlockCompressor::new()
            .with_alpha_threshold(AlphaThreshold::DISABLED)
            .compress(&pixels, 4, 4, PixelFormat::Dxt1A, 0, &mut |_| {})
            .unwrap();
        let c0 = u16::from_le_bytes([opaque[0], opaque[1]]);
        let c1 = u16::from_le_bytes([opaque[2], opaque[3]]);
        assert!(c0 > c1, "opaque blocks stay in four-colour mode");
    }

    #[test]
    fn test_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IntelBlockCompressor>();
    }
}
