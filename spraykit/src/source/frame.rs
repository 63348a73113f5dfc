//! Decoded RGBA8 frames.

use image::RgbaImage;

use super::LoadError;

/// A decoded image: `width * height` RGBA8 pixels, row-major, no padding.
///
/// Frames are never modified in place; cropping and composition produce new
/// frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterFrame {
    /// Wraps a pixel buffer, checking it holds exactly `width * height`
    /// pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(LoadError::InvalidFrame {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame of one colour. Zero dimensions are rejected as in
    /// [`RasterFrame::new`].
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, LoadError> {
        Self::new(width, height, rgba.repeat(width as usize * height as usize))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Copies the `width` × `height` region at `(x, y)`, clamped to the frame.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> RasterFrame {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let width = width.min(self.width - x).max(1);
        let height = height.min(self.height - y).max(1);

        if x == 0 && y == 0 && width == self.width && height == self.height {
            return self.clone();
        }

        let src_stride = self.width as usize * 4;
        let row_len = width as usize * 4;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in y..y + height {
            let start = row as usize * src_stride + x as usize * 4;
            pixels.extend_from_slice(&self.pixels[start..start + row_len]);
        }

        RasterFrame {
            width,
            height,
            pixels,
        }
    }

    /// Applies `f` to every pixel of a same-sized copy.
    pub fn map_pixels<F: FnMut(&mut [u8])>(mut self, f: F) -> RasterFrame {
        self.pixels.chunks_exact_mut(4).for_each(f);
        self
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl From<RgbaImage> for RasterFrame {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}
