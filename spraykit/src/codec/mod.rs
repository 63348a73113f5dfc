//! Conversion of RGBA8 pixel buffers into uncompressed output layouts.
//!
//! [`convert`] is the per-pixel half of the encoder: block formats go through
//! a [`BlockCompressor`](crate::compress::BlockCompressor), everything else
//! comes through here. All multi-byte words are written explicitly in the
//! byte order noted on each format family; nothing is reinterpreted through
//! pointers.
//!
//! Several families are approximations carried over for compatibility with
//! textures already produced by earlier releases:
//!
//! - `UV88`, `UVWQ8888` and `UVLX8888` scale unsigned channels into `0..=127`
//!   rather than producing true signed bump data.
//! - `RGBA16161616` widens 8-bit channels; there is no real 16-bit precision.
//! - `RGBA32323232F` scales into the full `u32` range before converting to a
//!   float, which is known to be wrong for engine consumption.
//!
//! Their output is kept bit-for-bit stable.

mod error;

pub use error::CodecError;

use crate::alpha::AlphaThreshold;
use crate::format::{PixelFormat, SourceLayout};

/// Colour key used by the bluescreen formats to mark transparent pixels.
pub const BLUESCREEN_KEY: [u8; 3] = [0, 0, 255];

/// Which source channels a passthrough format emits, in R, G, B, A order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelMask {
    r: bool,
    g: bool,
    b: bool,
    a: bool,
}

impl ChannelMask {
    fn for_layout(layout: SourceLayout) -> Option<Self> {
        let (r, g, b, a) = match layout {
            SourceLayout::Argb => (true, true, true, true),
            SourceLayout::Rgb => (true, true, true, false),
            SourceLayout::LumAlpha => (true, false, false, true),
            SourceLayout::Lum => (true, false, false, false),
            SourceLayout::Alpha => (false, false, false, true),
            SourceLayout::Invalid => return None,
        };
        Some(Self { r, g, b, a })
    }
}

/// ITU-R BT.601 luma in 16.16 fixed point.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + 32768;
    (y >> 16) as u8
}

/// Whether [`convert`] produces `format`.
pub fn is_supported(format: PixelFormat) -> bool {
    !format.is_block_compressed()
        && !matches!(
            format,
            PixelFormat::P8
                | PixelFormat::Rgba16161616F
                | PixelFormat::R32F
                | PixelFormat::Rgb323232F
        )
}

/// Convert `count` RGBA8 pixels from `src` into the byte layout of `format`.
///
/// The returned buffer is exactly `count × format.bytes_per_pixel()` long.
///
/// # Errors
///
/// - [`CodecError::InvalidSourceLayout`] when the format has no decoder
///   layout. This is an internal configuration fault, not bad input.
/// - [`CodecError::UnsupportedFormat`] for block formats and for the float
///   formats that have no conversion.
/// - [`CodecError::SourceTooShort`] when `src` holds fewer than `count` pixels.
pub fn convert(
    src: &[u8],
    count: usize,
    format: PixelFormat,
    alpha_threshold: AlphaThreshold,
) -> Result<Vec<u8>, CodecError> {
    let layout = format.source_layout();
    let mask = ChannelMask::for_layout(layout).ok_or(CodecError::InvalidSourceLayout(format))?;

    let needed = count * 4;
    if src.len() < needed {
        return Err(CodecError::SourceTooShort {
            needed,
            actual: src.len(),
        });
    }

    let pixels = src[..needed].chunks_exact(4);
    let mut out = Vec::with_capacity(count * format.bytes_per_pixel() as usize);

    match format {
        PixelFormat::Abgr8888 => {
            for p in pixels {
                out.extend_from_slice(&[p[3], p[2], p[1], p[0]]);
            }
        }
        PixelFormat::Argb8888 => {
            for p in pixels {
                out.extend_from_slice(&[p[3], p[0], p[1], p[2]]);
            }
        }
        // The X channel carries the source alpha unchanged.
        PixelFormat::Bgra8888 | PixelFormat::Bgrx8888 => {
            for p in pixels {
                out.extend_from_slice(&[p[2], p[1], p[0], p[3]]);
            }
        }
        PixelFormat::Bgr888 => {
            for p in pixels {
                out.extend_from_slice(&[p[2], p[1], p[0]]);
            }
        }
        PixelFormat::Bgr888Bluescreen => {
            for p in pixels {
                let [r, g, b] = bluescreen(p, alpha_threshold);
                out.extend_from_slice(&[b, g, r]);
            }
        }
        PixelFormat::Rgb888Bluescreen => {
            for p in pixels {
                out.extend_from_slice(&bluescreen(p, alpha_threshold));
            }
        }
        PixelFormat::Bgra4444 => {
            for p in pixels {
                let (r, g, b, a) = channels(p);
                let word = ((r & 0xF0) << 4) | (g & 0xF0) | ((b & 0xF0) >> 4) | ((a & 0xF0) << 8);
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        PixelFormat::Bgra5551 | PixelFormat::Bgrx5551 => {
            for p in pixels {
                let (r, g, b, a) = channels(p);
                let word = ((r & 0xF8) << 7) | ((g & 0xF8) << 2) | ((b & 0xF8) >> 3) | ((a & 0x80) << 8);
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        PixelFormat::Bgr565 => {
            for p in pixels {
                let (r, g, b, _) = channels(p);
                let word = ((r & 0xF8) << 8) | ((g & 0xFC) << 3) | ((b & 0xF8) >> 3);
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        PixelFormat::Rgb565 => {
            for p in pixels {
                let (r, g, b, _) = channels(p);
                let word = ((r & 0xF8) >> 3) | ((g & 0xFC) << 3) | ((b & 0xF8) << 8);
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        PixelFormat::Uv88 => {
            for p in pixels {
                out.extend_from_slice(&[signed_scale(p[0]), signed_scale(p[1])]);
            }
        }
        PixelFormat::Uvwq8888 | PixelFormat::Uvlx8888 => {
            for p in pixels {
                out.extend_from_slice(&[
                    signed_scale(p[0]),
                    signed_scale(p[1]),
                    signed_scale(p[2]),
                    signed_scale(p[3]),
                ]);
            }
        }
        PixelFormat::Rgba16161616 => {
            for p in pixels {
                for &c in p {
                    out.extend_from_slice(&widen_u16(c).to_le_bytes());
                }
            }
        }
        PixelFormat::Rgba32323232F => {
            for p in pixels {
                for &c in p {
                    // Native byte order, matching textures written on the
                    // platforms this format was produced on.
                    out.extend_from_slice(&widen_f32(c).to_ne_bytes());
                }
            }
        }
        PixelFormat::Rgb888
        | PixelFormat::Rgba8888
        | PixelFormat::A8
        | PixelFormat::I8
        | PixelFormat::Ia88 => {
            let luminance = matches!(layout, SourceLayout::Lum | SourceLayout::LumAlpha);
            for p in pixels {
                if mask.r {
                    out.push(if luminance { luma(p[0], p[1], p[2]) } else { p[0] });
                }
                if mask.g {
                    out.push(p[1]);
                }
                if mask.b {
                    out.push(p[2]);
                }
                if mask.a {
                    out.push(p[3]);
                }
            }
        }
        PixelFormat::Dxt1
        | PixelFormat::Dxt1A
        | PixelFormat::Dxt3
        | PixelFormat::Dxt5
        | PixelFormat::P8
        | PixelFormat::Rgba16161616F
        | PixelFormat::R32F
        | PixelFormat::Rgb323232F => return Err(CodecError::UnsupportedFormat(format)),
    }

    debug_assert_eq!(out.len(), count * format.bytes_per_pixel() as usize);
    Ok(out)
}

#[inline]
fn channels(p: &[u8]) -> (u16, u16, u16, u16) {
    (
        u16::from(p[0]),
        u16::from(p[1]),
        u16::from(p[2]),
        u16::from(p[3]),
    )
}

/// Key out transparent pixels, nudging genuine key-coloured pixels off the key
/// first so they stay visible.
#[inline]
fn bluescreen(p: &[u8], alpha_threshold: AlphaThreshold) -> [u8; 3] {
    let mut rgb = [p[0], p[1], p[2]];
    if rgb == BLUESCREEN_KEY {
        rgb[2] = 254;
    }
    if alpha_threshold.is_below(p[3]) {
        rgb = BLUESCREEN_KEY;
    }
    rgb
}

/// Approximate: maps `0..=255` linearly onto `0..=127`.
#[inline]
fn signed_scale(c: u8) -> u8 {
    (127.0 * (f64::from(c) / 255.0)) as u8
}

/// Approximate: maps `0..=255` linearly onto `0..=65535`.
#[inline]
fn widen_u16(c: u8) -> u16 {
    (65535.0 * (f64::from(c) / 255.0)) as u16
}

/// Approximate and known wrong: scales into the `u32` range, then stores the
/// result as a float.
#[inline]
fn widen_f32(c: u8) -> f32 {
    (4_294_967_295.0 * (f64::from(c) / 255.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: AlphaThreshold = AlphaThreshold::DISABLED;

    fn px(r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
        vec![r, g, b, a]
    }

    #[test]
    fn test_output_length_matches_bytes_per_pixel() {
        let src: Vec<u8> = (0..=255u8).cycle().take(4 * 10).collect();
        for format in PixelFormat::ALL {
            match convert(&src, 10, format, THRESHOLD) {
                Ok(out) => assert_eq!(out.len(), 10 * format.bytes_per_pixel() as usize),
                Err(CodecError::UnsupportedFormat(_)) | Err(CodecError::InvalidSourceLayout(_)) => {}
                Err(e) => panic!("{}: {}", format, e),
            }
        }
    }

    #[test]
    fn test_is_supported_agrees_with_convert() {
        let src = [0u8; 4];
        for format in PixelFormat::ALL {
            assert_eq!(
                is_supported(format),
                convert(&src, 1, format, THRESHOLD).is_ok(),
                "{}",
                format
            );
        }
    }

    #[test]
    fn test_byte_reorders() {
        let src = px(1, 2, 3, 4);
        assert_eq!(convert(&src, 1, PixelFormat::Abgr8888, THRESHOLD).unwrap(), [4, 3, 2, 1]);
        assert_eq!(convert(&src, 1, PixelFormat::Argb8888, THRESHOLD).unwrap(), [4, 1, 2, 3]);
        assert_eq!(convert(&src, 1, PixelFormat::Bgra8888, THRESHOLD).unwrap(), [3, 2, 1, 4]);
        assert_eq!(convert(&src, 1, PixelFormat::Bgrx8888, THRESHOLD).unwrap(), [3, 2, 1, 4]);
        assert_eq!(convert(&src, 1, PixelFormat::Bgr888, THRESHOLD).unwrap(), [3, 2, 1]);
    }

    #[test]
    fn test_passthrough_formats() {
        let src = px(10, 20, 30, 40);
        assert_eq!(convert(&src, 1, PixelFormat::Rgb888, THRESHOLD).unwrap(), [10, 20, 30]);
        assert_eq!(convert(&src, 1, PixelFormat::Rgba8888, THRESHOLD).unwrap(), [10, 20, 30, 40]);
        assert_eq!(convert(&src, 1, PixelFormat::A8, THRESHOLD).unwrap(), [40]);

        let white = px(255, 255, 255, 99);
        assert_eq!(convert(&white, 1, PixelFormat::I8, THRESHOLD).unwrap(), [255]);
        assert_eq!(convert(&white, 1, PixelFormat::Ia88, THRESHOLD).unwrap(), [255, 99]);
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_packed_16_bit_truncates() {
        let src = px(0xFF, 0xFF, 0xFF, 0xFF);
        assert_eq!(convert(&src, 1, PixelFormat::Bgra4444, THRESHOLD).unwrap(), [0xFF, 0xFF]);
        assert_eq!(convert(&src, 1, PixelFormat::Bgra5551, THRESHOLD).unwrap(), [0xFF, 0xFF]);
        assert_eq!(convert(&src, 1, PixelFormat::Bgr565, THRESHOLD).unwrap(), [0xFF, 0xFF]);

        // Low bits are dropped, not rounded.
        let red = px(0x0F, 0, 0, 0);
        assert_eq!(convert(&red, 1, PixelFormat::Bgr565, THRESHOLD).unwrap(), [0x00, 0x00]);

        // Red in the high bits for BGR565, low bits for RGB565.
        let red = px(0xF8, 0, 0, 0);
        assert_eq!(convert(&red, 1, PixelFormat::Bgr565, THRESHOLD).unwrap(), [0x00, 0xF8]);
        assert_eq!(convert(&red, 1, PixelFormat::Rgb565, THRESHOLD).unwrap(), [0x1F, 0x00]);

        // Alpha is the top bit for 5551.
        let alpha = px(0, 0, 0, 0x80);
        assert_eq!(convert(&alpha, 1, PixelFormat::Bgra5551, THRESHOLD).unwrap(), [0x00, 0x80]);
        let alpha = px(0, 0, 0, 0x7F);
        assert_eq!(convert(&alpha, 1, PixelFormat::Bgra5551, THRESHOLD).unwrap(), [0x00, 0x00]);

        let mixed = px(0x12, 0x34, 0x56, 0x78);
        // a=7 r=1 g=3 b=5
        assert_eq!(convert(&mixed, 1, PixelFormat::Bgra4444, THRESHOLD).unwrap(), [0x35, 0x71]);
    }

    #[test]
    fn test_bluescreen_keys_transparent_pixels() {
        let threshold = AlphaThreshold::new(128);
        let transparent = px(200, 100, 50, 10);
        assert_eq!(
            convert(&transparent, 1, PixelFormat::Bgr888Bluescreen, threshold).unwrap(),
            [255, 0, 0]
        );
        assert_eq!(
            convert(&transparent, 1, PixelFormat::Rgb888Bluescreen, threshold).unwrap(),
            [0, 0, 255]
        );
    }

    #[test]
    fn test_bluescreen_perturbs_genuine_key_colour() {
        let threshold = AlphaThreshold::new(128);
        let blue = px(0, 0, 255, 255);
        assert_eq!(
            convert(&blue, 1, PixelFormat::Rgb888Bluescreen, threshold).unwrap(),
            [0, 0, 254]
        );
        let near = px(0, 1, 255, 255);
        assert_eq!(
            convert(&near, 1, PixelFormat::Rgb888Bluescreen, threshold).unwrap(),
            [0, 1, 255]
        );
    }

    #[test]
    fn test_bluescreen_never_keys_opaque_pixels() {
        let threshold = AlphaThreshold::new(128);
        for alpha in [128u8, 200, 255] {
            for (r, g, b) in [(0u8, 0u8, 255u8), (0, 0, 254), (12, 34, 56)] {
                let out = convert(&px(r, g, b, alpha), 1, PixelFormat::Rgb888Bluescreen, threshold)
                    .unwrap();
                assert_ne!(out, BLUESCREEN_KEY);
            }
        }
    }

    #[test]
    fn test_bump_scaling() {
        let src = px(255, 0, 128, 255);
        assert_eq!(convert(&src, 1, PixelFormat::Uv88, THRESHOLD).unwrap(), [127, 0]);
        assert_eq!(
            convert(&src, 1, PixelFormat::Uvwq8888, THRESHOLD).unwrap(),
            [127, 0, 63, 127]
        );
    }

    #[test]
    fn test_rgba16161616_widens() {
        let src = px(255, 0, 255, 0);
        assert_eq!(
            convert(&src, 1, PixelFormat::Rgba16161616, THRESHOLD).unwrap(),
            [0xFF, 0xFF, 0, 0, 0xFF, 0xFF, 0, 0]
        );
    }

    #[test]
    fn test_rgba32323232f_keeps_known_scaling() {
        let src = px(255, 0, 0, 0);
        let out = convert(&src, 1, PixelFormat::Rgba32323232F, THRESHOLD).unwrap();
        let r = f32::from_ne_bytes([out[0], out[1], out[2], out[3]]);
        assert_eq!(r, 4_294_967_295.0_f64 as f32);
        assert_eq!(&out[4..8], &0.0f32.to_ne_bytes());
    }

    #[test]
    fn test_invalid_layout_is_configuration_error() {
        let src = px(1, 2, 3, 4);
        assert_eq!(
            convert(&src, 1, PixelFormat::P8, THRESHOLD),
            Err(CodecError::InvalidSourceLayout(PixelFormat::P8))
        );
    }

    #[test]
    fn test_block_and_unimplemented_formats_rejected() {
        let src = px(1, 2, 3, 4);
        for format in [PixelFormat::Dxt1, PixelFormat::Dxt5, PixelFormat::R32F, PixelFormat::Rgba16161616F] {
            assert_eq!(
                convert(&src, 1, format, THRESHOLD),
                Err(CodecError::UnsupportedFormat(format))
            );
        }
    }

    #[test]
    fn test_short_source() {
        let src = px(1, 2, 3, 4);
        assert_eq!(
            convert(&src, 2, PixelFormat::Rgba8888, THRESHOLD),
            Err(CodecError::SourceTooShort { needed: 8, actual: 4 })
        );
    }
}
