//! Output pixel formats and their static properties.
//!
//! Every encoding the pipeline can emit is a variant of [`PixelFormat`]. The
//! properties of a variant (storage size, alpha support, container code and
//! display names) live in a constant table and are reached through
//! [`PixelFormat::info`], so the rest of the crate matches on the enum
//! exhaustively instead of dispatching through trait objects.
//!
//! # Example
//!
//! ```
//! use spraykit::format::{AlphaClass, PixelFormat};
//!
//! let format: PixelFormat = "dxt1a".parse().unwrap();
//! assert!(format.is_block_compressed());
//! assert_eq!(format.bytes_per_block(), 8);
//! assert_eq!(format.alpha_class(), AlphaClass::OneBit);
//! ```

mod catalog;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use catalog::FormatInfo;

/// How much transparency a format can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaClass {
    /// Fully opaque, alpha is discarded.
    None,
    /// Transparent or opaque, nothing in between.
    OneBit,
    /// Graded transparency.
    MultiBit,
}

/// Channel layout the decode stage hands to the pixel codec for a format.
///
/// Luminance layouts replace the red channel with the pixel's luma before
/// conversion; the remaining channels are read from the RGBA source as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLayout {
    /// Red, green, blue and alpha.
    Argb,
    /// Red, green and blue.
    Rgb,
    /// Luma in red, plus alpha.
    LumAlpha,
    /// Luma in red.
    Lum,
    /// Alpha only.
    Alpha,
    /// No decoder layout exists for the format.
    Invalid,
}

/// Image format codes as stored in a VTF 7.1 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VtfImageFormat {
    None = u32::MAX,
    Rgba8888 = 0,
    Abgr8888 = 1,
    Rgb888 = 2,
    Bgr888 = 3,
    Rgb565 = 4,
    I8 = 5,
    Ia88 = 6,
    P8 = 7,
    A8 = 8,
    Rgb888Bluescreen = 9,
    Bgr888Bluescreen = 10,
    Argb8888 = 11,
    Bgra8888 = 12,
    Dxt1 = 13,
    Dxt3 = 14,
    Dxt5 = 15,
    Bgrx8888 = 16,
    Bgr565 = 17,
    Bgrx5551 = 18,
    Bgra4444 = 19,
    Dxt1OneBitAlpha = 20,
    Bgra5551 = 21,
    Uv88 = 22,
    Uvwq8888 = 23,
    Rgba16161616F = 24,
    Rgba16161616 = 25,
    Uvlx8888 = 26,
    R32F = 27,
    Rgb323232F = 28,
    Rgba32323232F = 29,
}

impl VtfImageFormat {
    /// The little-endian `u32` written to the header.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Error returned when a format name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown pixel format: {0}")]
pub struct FormatError(pub String);

/// An output pixel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Dxt1,
    Dxt1A,
    Dxt3,
    Dxt5,
    A8,
    I8,
    P8,
    Ia88,
    Bgr565,
    Bgr888,
    Bgr888Bluescreen,
    Bgra4444,
    Bgra5551,
    Bgra8888,
    Bgrx5551,
    Bgrx8888,
    Rgb565,
    Rgb888,
    Rgb888Bluescreen,
    Rgba8888,
    Abgr8888,
    Argb8888,
    Rgba16161616,
    Rgba16161616F,
    Uv88,
    Uvlx8888,
    Uvwq8888,
    R32F,
    Rgb323232F,
    Rgba32323232F,
}

impl PixelFormat {
    /// Every format, in catalog order.
    pub const ALL: [PixelFormat; 30] = [
        PixelFormat::Dxt1,
        PixelFormat::Dxt1A,
        PixelFormat::Dxt3,
        PixelFormat::Dxt5,
        PixelFormat::A8,
        PixelFormat::I8,
        PixelFormat::P8,
        PixelFormat::Ia88,
        PixelFormat::Bgr565,
        PixelFormat::Bgr888,
        PixelFormat::Bgr888Bluescreen,
        PixelFormat::Bgra4444,
        PixelFormat::Bgra5551,
        PixelFormat::Bgra8888,
        PixelFormat::Bgrx5551,
        PixelFormat::Bgrx8888,
        PixelFormat::Rgb565,
        PixelFormat::Rgb888,
        PixelFormat::Rgb888Bluescreen,
        PixelFormat::Rgba8888,
        PixelFormat::Abgr8888,
        PixelFormat::Argb8888,
        PixelFormat::Rgba16161616,
        PixelFormat::Rgba16161616F,
        PixelFormat::Uv88,
        PixelFormat::Uvlx8888,
        PixelFormat::Uvwq8888,
        PixelFormat::R32F,
        PixelFormat::Rgb323232F,
        PixelFormat::Rgba32323232F,
    ];

    /// Static properties of this format.
    ///
    /// The other accessors on `PixelFormat` read single fields of this
    /// record.
    pub fn info(self) -> &'static FormatInfo {
        &catalog::CATALOG[self as usize]
    }

    /// Canonical lowercase name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Human-readable name, either the simplified description or the
    /// technical one.
    ///
    /// # Arguments
    ///
    /// * `simple` - `true` for the plain-language description shown in the
    ///   simplified format list, `false` for the technical name
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::PixelFormat;
    ///
    /// assert_eq!(PixelFormat::Dxt5.display_name(false), "DXT5 / BC3");
    /// assert_eq!(
    ///     PixelFormat::Dxt5.display_name(true),
    ///     "Compressed with full transparency"
    /// );
    /// ```
    pub fn display_name(self, simple: bool) -> &'static str {
        let info = self.info();
        if simple {
            info.simple_name
        } else {
            info.advanced_name
        }
    }

    /// Whether the format is stored as 4×4 compressed blocks.
    pub fn is_block_compressed(self) -> bool {
        self.info().bytes_per_block != 0
    }

    /// Bytes per pixel for uncompressed formats, 0 for block formats.
    pub fn bytes_per_pixel(self) -> u32 {
        self.info().bytes_per_pixel
    }

    /// Bytes per 4×4 block for block formats, 0 otherwise.
    pub fn bytes_per_block(self) -> u32 {
        self.info().bytes_per_block
    }

    pub fn alpha_class(self) -> AlphaClass {
        self.info().alpha
    }

    pub fn has_one_bit_alpha(self) -> bool {
        self.alpha_class() == AlphaClass::OneBit
    }

    pub fn has_multi_bit_alpha(self) -> bool {
        self.alpha_class() == AlphaClass::MultiBit
    }

    /// One-bit or multi-bit alpha.
    pub fn has_alpha(self) -> bool {
        self.alpha_class() != AlphaClass::None
    }

    /// Channel layout the pixel codec expects.
    ///
    /// [`SourceLayout::Invalid`] marks a format with no conversion path
    /// (`P8`); jobs using it fail validation with a configuration error.
    pub fn source_layout(self) -> SourceLayout {
        self.info().layout
    }

    /// Code written to the header's format field.
    ///
    /// Several formats share a code: `dxt1a` is stored as plain DXT1, and
    /// `rgb888_bluescreen` as RGB888.
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::{PixelFormat, VtfImageFormat};
    ///
    /// assert_eq!(PixelFormat::Dxt1A.vtf_format(), VtfImageFormat::Dxt1);
    /// assert_eq!(PixelFormat::Bgr888.vtf_format().code(), 3);
    /// ```
    pub fn vtf_format(self) -> VtfImageFormat {
        self.info().vtf
    }

    /// Formats a user can pick, optionally limited to the simplified set.
    ///
    /// Hidden formats (unimplemented, approximate or carrying an unused
    /// channel) are never offered.
    ///
    /// # Arguments
    ///
    /// * `simple_only` - Limit the list to the formats most sprays need
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::PixelFormat;
    ///
    /// let simple: Vec<_> = PixelFormat::selectable(true).collect();
    /// assert!(simple.contains(&PixelFormat::Dxt1A));
    /// assert!(!simple.contains(&PixelFormat::Bgr888));
    ///
    /// assert!(!PixelFormat::selectable(false).any(|f| f == PixelFormat::R32F));
    /// ```
    pub fn selectable(simple_only: bool) -> impl Iterator<Item = PixelFormat> {
        Self::ALL
            .into_iter()
            .filter(move |f| !f.info().hidden && (!simple_only || f.info().simple))
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| FormatError(s.to_string()))
    }
}
