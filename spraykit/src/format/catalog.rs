//! The constant format table, indexed by `PixelFormat as usize`.

use super::{AlphaClass, PixelFormat, SourceLayout, VtfImageFormat};

/// Immutable properties of one [`PixelFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub format: PixelFormat,
    /// Canonical lowercase name.
    pub name: &'static str,
    /// Bytes per pixel, zero for block formats.
    pub bytes_per_pixel: u32,
    /// Bytes per 4×4 block, zero for pixel formats.
    pub bytes_per_block: u32,
    pub alpha: AlphaClass,
    pub layout: SourceLayout,
    pub vtf: VtfImageFormat,
    pub simple_name: &'static str,
    pub advanced_name: &'static str,
    /// Offered when only simplified names are shown.
    pub simple: bool,
    /// Never offered to users.
    pub hidden: bool,
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    format: PixelFormat,
    name: &'static str,
    bytes_per_pixel: u32,
    bytes_per_block: u32,
    alpha: AlphaClass,
    layout: SourceLayout,
    vtf: VtfImageFormat,
    simple_name: &'static str,
    advanced_name: &'static str,
    simple: bool,
    hidden: bool,
) -> FormatInfo {
    FormatInfo {
        format,
        name,
        bytes_per_pixel,
        bytes_per_block,
        alpha,
        layout,
        vtf,
        simple_name,
        advanced_name,
        simple,
        hidden,
    }
}

use AlphaClass::{MultiBit, None as Opaque, OneBit};
use SourceLayout::{Alpha, Argb, Invalid, Lum, LumAlpha, Rgb};

#[rustfmt::skip]
pub(super) static CATALOG: [FormatInfo; 30] = [
    entry(PixelFormat::Dxt1, "dxt1", 0, 8, Opaque, Argb, VtfImageFormat::Dxt1,
        "Compressed with no transparency", "DXT1 / BC1", false, false),
    // The DXT1_ONEBITALPHA code is not honoured by engines; plain DXT1 decodes
    // punch-through blocks correctly.
    entry(PixelFormat::Dxt1A, "dxt1a", 0, 8, OneBit, Argb, VtfImageFormat::Dxt1,
        "Compressed with background transparency", "DXT1A / BC1", true, false),
    entry(PixelFormat::Dxt3, "dxt3", 0, 16, MultiBit, Argb, VtfImageFormat::Dxt3,
        "Compressed with coarse transparency", "DXT3 / BC2", false, false),
    entry(PixelFormat::Dxt5, "dxt5", 0, 16, MultiBit, Argb, VtfImageFormat::Dxt5,
        "Compressed with full transparency", "DXT5 / BC3", true, false),
    entry(PixelFormat::A8, "a8", 1, 0, MultiBit, Alpha, VtfImageFormat::A8,
        "Stencil with full transparency", "A8", false, false),
    entry(PixelFormat::I8, "i8", 1, 0, Opaque, Lum, VtfImageFormat::I8,
        "Uncompressed black and white", "I8", true, false),
    entry(PixelFormat::P8, "p8", 1, 0, OneBit, Invalid, VtfImageFormat::P8,
        "256-colour palette", "P8", false, true),
    entry(PixelFormat::Ia88, "ia88", 2, 0, MultiBit, LumAlpha, VtfImageFormat::Ia88,
        "Uncompressed black and white with full transparency", "IA88", true, false),
    entry(PixelFormat::Bgr565, "bgr565", 2, 0, Opaque, Rgb, VtfImageFormat::Bgr565,
        "BGR565", "BGR565", false, false),
    entry(PixelFormat::Bgr888, "bgr888", 3, 0, Opaque, Rgb, VtfImageFormat::Bgr888,
        "Uncompressed", "BGR888", false, false),
    entry(PixelFormat::Bgr888Bluescreen, "bgr888_bluescreen", 3, 0, OneBit, Argb,
        VtfImageFormat::Bgr888Bluescreen,
        "Uncompressed with background transparency", "BGR888 Bluescreen", true, false),
    entry(PixelFormat::Bgra4444, "bgra4444", 2, 0, MultiBit, Argb, VtfImageFormat::Bgra4444,
        "BGRA4444", "BGRA4444", false, false),
    entry(PixelFormat::Bgra5551, "bgra5551", 2, 0, OneBit, Argb, VtfImageFormat::Bgra5551,
        "BGRA5551", "BGRA5551", false, false),
    entry(PixelFormat::Bgra8888, "bgra8888", 4, 0, MultiBit, Argb, VtfImageFormat::Bgra8888,
        "Uncompressed with full transparency", "BGRA8888", false, false),
    entry(PixelFormat::Bgrx5551, "bgrx5551", 2, 0, Opaque, Argb, VtfImageFormat::Bgrx5551,
        "BGRX5551", "BGRX5551", false, true),
    entry(PixelFormat::Bgrx8888, "bgrx8888", 4, 0, Opaque, Argb, VtfImageFormat::Bgrx8888,
        "BGRX8888", "BGRX8888", false, true),
    entry(PixelFormat::Rgb565, "rgb565", 2, 0, Opaque, Rgb, VtfImageFormat::Rgb565,
        "RGB565", "RGB565", false, false),
    entry(PixelFormat::Rgb888, "rgb888", 3, 0, Opaque, Rgb, VtfImageFormat::Rgb888,
        "Uncompressed", "RGB888", false, false),
    // Stored under the plain RGB888 code; engines do not key this variant.
    entry(PixelFormat::Rgb888Bluescreen, "rgb888_bluescreen", 3, 0, OneBit, Argb,
        VtfImageFormat::Rgb888,
        "RGB888 Bluescreen", "RGB888 Bluescreen", false, false),
    entry(PixelFormat::Rgba8888, "rgba8888", 4, 0, MultiBit, Argb, VtfImageFormat::Rgba8888,
        "Uncompressed with full transparency", "RGBA8888", true, false),
    entry(PixelFormat::Abgr8888, "abgr8888", 4, 0, MultiBit, Argb, VtfImageFormat::Abgr8888,
        "ABGR8888", "ABGR8888", false, true),
    entry(PixelFormat::Argb8888, "argb8888", 4, 0, MultiBit, Argb, VtfImageFormat::Argb8888,
        "ARGB8888", "ARGB8888", false, true),
    entry(PixelFormat::Rgba16161616, "rgba16161616", 8, 0, MultiBit, Argb,
        VtfImageFormat::Rgba16161616, "RGBA16161616", "RGBA16161616", false, true),
    entry(PixelFormat::Rgba16161616F, "rgba16161616f", 8, 0, MultiBit, Argb,
        VtfImageFormat::Rgba16161616F, "RGBA16161616F", "RGBA16161616F", false, true),
    entry(PixelFormat::Uv88, "uv88", 2, 0, Opaque, Rgb, VtfImageFormat::Uv88,
        "UV88", "UV88", false, true),
    entry(PixelFormat::Uvlx8888, "uvlx8888", 4, 0, Opaque, Argb, VtfImageFormat::Uvlx8888,
        "UVLX8888", "UVLX8888", false, true),
    entry(PixelFormat::Uvwq8888, "uvwq8888", 4, 0, MultiBit, Argb, VtfImageFormat::Uvwq8888,
        "UVWQ8888", "UVWQ8888", false, true),
    // R32F and RGB323232F keep the 16-byte stride of the four-channel float
    // format; they have no conversion and stay hidden.
    entry(PixelFormat::R32F, "r32f", 16, 0, Opaque, Argb, VtfImageFormat::R32F,
        "R32F", "R32F", false, true),
    entry(PixelFormat::Rgb323232F, "rgb323232f", 16, 0, Opaque, Argb,
        VtfImageFormat::Rgb323232F, "RGB323232F", "RGB323232F", false, true),
    entry(PixelFormat::Rgba32323232F, "rgba32323232f", 16, 0, MultiBit, Argb,
        VtfImageFormat::Rgba32323232F, "RGBA32323232F", "RGBA32323232F", false, true),
];
