//! The fixed 64-byte VTF 7.1 header.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::format::AlphaClass;
use crate::job::{EncodingJob, TextureSampleMode};

/// Size of the header and offset of the first mip level.
pub const HEADER_SIZE: usize = 64;

const SIGNATURE: [u8; 4] = *b"VTF\0";
const VERSION: [u32; 2] = [7, 1];
const REFLECTIVITY: f32 = 0.5;
const BUMP_SCALE: f32 = 1.0;
const NO_LOW_RES_FORMAT: u32 = u32::MAX;
// Trailing byte written by existing VTF 7.1 spray tools
const RESERVED_FILLER: u8 = 20;

/// Texture flags word at offset 20 of the header.
///
/// A plain bit set: combine with `|`, test with [`VtfFlags::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VtfFlags(u32);

impl VtfFlags {
    pub const POINTSAMPLE: VtfFlags = VtfFlags(0x0000_0001);
    pub const TRILINEAR: VtfFlags = VtfFlags(0x0000_0002);
    pub const CLAMPS: VtfFlags = VtfFlags(0x0000_0004);
    pub const CLAMPT: VtfFlags = VtfFlags(0x0000_0008);
    pub const ANISOTROPIC: VtfFlags = VtfFlags(0x0000_0010);
    pub const NOMIP: VtfFlags = VtfFlags(0x0000_0100);
    pub const NOLOD: VtfFlags = VtfFlags(0x0000_0200);
    pub const ALL_MIPS: VtfFlags = VtfFlags(0x0000_0400);
    pub const ONEBITALPHA: VtfFlags = VtfFlags(0x0000_1000);
    pub const EIGHTBITALPHA: VtfFlags = VtfFlags(0x0000_2000);
    pub const CLAMPU: VtfFlags = VtfFlags(0x0200_0000);

    pub const fn empty() -> Self {
        VtfFlags(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        VtfFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: VtfFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags for a texture with the given properties.
    ///
    /// Every texture clamps on all axes and opts out of LOD. Point sampling is
    /// only set for single-level textures.
    ///
    /// # Arguments
    ///
    /// * `mipmaps` - Number of mip levels; 1 adds `NOMIP`
    /// * `alpha` - Alpha class of the pixel format
    /// * `sample_mode` - Filtering requested for the texture
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::AlphaClass;
    /// use spraykit::job::TextureSampleMode;
    /// use spraykit::vtf::VtfFlags;
    ///
    /// let flags = VtfFlags::for_texture(1, AlphaClass::OneBit, TextureSampleMode::PointSample);
    /// assert!(flags.contains(VtfFlags::NOMIP | VtfFlags::ONEBITALPHA | VtfFlags::POINTSAMPLE));
    ///
    /// // Point sampling is dropped once there are mip levels
    /// let flags = VtfFlags::for_texture(4, AlphaClass::OneBit, TextureSampleMode::PointSample);
    /// assert!(!flags.contains(VtfFlags::POINTSAMPLE));
    /// assert!(!flags.contains(VtfFlags::NOMIP));
    /// ```
    pub fn for_texture(mipmaps: u32, alpha: AlphaClass, sample_mode: TextureSampleMode) -> Self {
        let mut flags = Self::CLAMPS | Self::CLAMPT | Self::CLAMPU | Self::NOLOD | Self::ALL_MIPS;

        if mipmaps == 1 {
            flags |= Self::NOMIP;
        }

        match alpha {
            AlphaClass::OneBit => flags |= Self::ONEBITALPHA,
            AlphaClass::MultiBit => flags |= Self::EIGHTBITALPHA,
            AlphaClass::None => {}
        }

        match sample_mode {
            TextureSampleMode::PointSample if mipmaps == 1 => flags |= Self::POINTSAMPLE,
            TextureSampleMode::Trilinear => flags |= Self::TRILINEAR,
            TextureSampleMode::Anisotropic => flags |= Self::ANISOTROPIC,
            TextureSampleMode::PointSample | TextureSampleMode::None => {}
        }

        flags
    }
}

impl BitOr for VtfFlags {
    type Output = VtfFlags;

    fn bitor(self, rhs: VtfFlags) -> VtfFlags {
        VtfFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for VtfFlags {
    fn bitor_assign(&mut self, rhs: VtfFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for VtfFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// The fields of a VTF 7.1 header that vary between textures.
///
/// Everything else in the 64 bytes is constant: signature, version, header
/// size, reflectivity, bump scale, the absent low-resolution image and the
/// trailing filler byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VtfHeader {
    pub width: u16,
    pub height: u16,
    pub flags: VtfFlags,
    pub frames: u16,
    /// High-resolution image format code.
    pub format: u32,
    pub mipmaps: u8,
}

impl VtfHeader {
    /// Header for a validated job.
    ///
    /// Dimensions, frame and mip counts are narrowed to their header widths;
    /// validation guarantees they fit.
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::PixelFormat;
    /// use spraykit::job::EncodingJob;
    /// use spraykit::vtf::{VtfFlags, VtfHeader, HEADER_SIZE};
    ///
    /// let mut job = EncodingJob::new(PixelFormat::Dxt5).with_resolution(256, 128);
    /// job.recompute();
    ///
    /// let header = VtfHeader::for_job(&job);
    /// assert_eq!((header.width, header.height, header.mipmaps), (256, 128, 1));
    /// assert!(header.flags.contains(VtfFlags::EIGHTBITALPHA));
    ///
    /// let bytes = header.to_bytes();
    /// assert_eq!(bytes.len(), HEADER_SIZE);
    /// assert_eq!(VtfHeader::from_bytes(&bytes), Some(header));
    /// ```
    pub fn for_job(job: &EncodingJob) -> Self {
        let format = job.format();
        Self {
            width: job.width() as u16,
            height: job.height() as u16,
            flags: VtfFlags::for_texture(job.mipmaps(), format.alpha_class(), job.sample_mode()),
            frames: job.frames() as u16,
            format: format.vtf_format().code(),
            mipmaps: job.mipmaps() as u8,
        }
    }

    /// Serialises the header, little-endian throughout.
    ///
    /// # Returns
    ///
    /// The complete 64-byte header, ready to be written at offset 0.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = Vec::with_capacity(HEADER_SIZE);

        out.extend_from_slice(&SIGNATURE);
        out.extend_from_slice(&VERSION[0].to_le_bytes());
        out.extend_from_slice(&VERSION[1].to_le_bytes());
        out.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.flags.bits().to_le_bytes());
        out.extend_from_slice(&self.frames.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // first frame
        out.extend_from_slice(b"CMC3");
        for _ in 0..3 {
            out.extend_from_slice(&REFLECTIVITY.to_le_bytes());
        }
        out.extend_from_slice(b"BFF!");
        out.extend_from_slice(&BUMP_SCALE.to_le_bytes());
        out.extend_from_slice(&self.format.to_le_bytes());
        out.push(self.mipmaps);
        out.extend_from_slice(&NO_LOW_RES_FORMAT.to_le_bytes());
        out.push(0); // low-res width
        out.push(0); // low-res height
        out.push(RESERVED_FILLER);

        let mut bytes = [0u8; HEADER_SIZE];
        bytes.copy_from_slice(&out);
        bytes
    }

    /// Parses the varying fields back out of a header. Returns `None` when
    /// the buffer is short or is not a VTF 7.1 header.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..HEADER_SIZE)?;
        if header[..4] != SIGNATURE || read_u32(header, 4) != VERSION[0] || read_u32(header, 8) != VERSION[1] {
            return None;
        }

        Some(Self {
            width: read_u16(header, 16),
            height: read_u16(header, 18),
            flags: VtfFlags::from_bits(read_u32(header, 20)),
            frames: read_u16(header, 24),
            format: read_u32(header, 52),
            mipmaps: header[56],
        })
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
