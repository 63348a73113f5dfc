//! Autocrop border detection.
//!
//! A border is any run of columns or rows, starting at an image edge, whose
//! pixels all match the corner pixel of that edge. [`find_borders`] scans
//! inward from each edge and returns the rectangle that remains.
//!
//! ```text
//!   (0,0) reference for left/top        (w-1,0) reference for right
//!        ┌───────────────────────────────┐
//!        │ . . . . . . . . . . . . . . . │
//!        │ . . ┌─────────────────┐ . . . │
//!        │ . . │     content     │ . . . │
//!        │ . . └─────────────────┘ . . . │
//!        │ . . . . . . . . . . . . . . . │
//!        └───────────────────────────────┘
//!   (0,h-1) reference for bottom
//! ```
//!
//! Pixel comparison packs R, G and B with an alpha contribution chosen by
//! [`AlphaMode`], so formats that cannot store partial alpha treat every
//! below-threshold pixel as the same colour.

use std::ops::{Add, AddAssign};

use crate::alpha::AlphaThreshold;
use crate::format::{AlphaClass, PixelFormat};

/// How alpha takes part in pixel comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    /// Exact alpha value.
    Full,
    /// Transparent below the threshold, opaque otherwise.
    Threshold,
    /// Alpha ignored.
    None,
}

impl AlphaMode {
    /// Comparison mode matching what `format` can store.
    pub fn for_format(format: PixelFormat) -> Self {
        match format.alpha_class() {
            AlphaClass::MultiBit => AlphaMode::Full,
            AlphaClass::OneBit | AlphaClass::None => AlphaMode::Threshold,
        }
    }
}

/// Content rectangle of a frame, inclusive on all edges.
///
/// `width` and `height` are carried separately from the edges. For a single
/// frame they equal the edge span, except a single column or row which
/// reports the full frame extent. Under union they become upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for BoundingBox {
    /// The identity for union.
    fn default() -> Self {
        Self {
            left: u32::MAX,
            right: 0,
            top: u32::MAX,
            bottom: 0,
            width: 0,
            height: 0,
        }
    }
}

impl BoundingBox {
    /// Box covering a whole `width` × `height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            right: width.saturating_sub(1),
            top: 0,
            bottom: height.saturating_sub(1),
            width,
            height,
        }
    }

    /// True for the union identity or any box without area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.left > self.right || self.top > self.bottom
    }

    /// Crop rectangle `(x, y, width, height)` of this box within a frame,
    /// clamped so it never leaves the frame.
    pub fn crop_rect(&self, frame_width: u32, frame_height: u32) -> (u32, u32, u32, u32) {
        if self.is_empty() || frame_width == 0 || frame_height == 0 {
            return (0, 0, frame_width, frame_height);
        }
        let x = self.left.min(frame_width - 1);
        let y = self.top.min(frame_height - 1);
        let w = self.width.min(frame_width - x).max(1);
        let h = self.height.min(frame_height - y).max(1);
        (x, y, w, h)
    }
}

impl AddAssign for BoundingBox {
    fn add_assign(&mut self, other: Self) {
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
        self.width = self.width.max(other.width);
        self.height = self.height.max(other.height);
    }
}

impl Add for BoundingBox {
    type Output = BoundingBox;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// Packs a pixel into a comparison key.
#[inline]
fn pixel_key(px: &[u8], mode: AlphaMode, threshold: AlphaThreshold) -> u32 {
    let rgb = u32::from(px[0]) | u32::from(px[1]) << 8 | u32::from(px[2]) << 16;
    match mode {
        AlphaMode::Full => rgb | u32::from(px[3]) << 24,
        AlphaMode::Threshold if threshold.is_below(px[3]) => 0,
        AlphaMode::Threshold => rgb | 0xFF00_0000,
        AlphaMode::None => rgb,
    }
}

/// Finds the content box of an RGBA8 frame.
///
/// Returns the default (empty) box for a zero-sized frame or a buffer
/// shorter than `width * height * 4`.
pub fn find_borders(
    pixels: &[u8],
    width: u32,
    height: u32,
    mode: AlphaMode,
    threshold: AlphaThreshold,
) -> BoundingBox {
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 || pixels.len() < w * h * 4 {
        return BoundingBox::default();
    }

    let key = |x: usize, y: usize| {
        let i = (y * w + x) * 4;
        pixel_key(&pixels[i..i + 4], mode, threshold)
    };

    let column_differs = |x: usize, reference: u32| (0..h).any(|y| key(x, y) != reference);
    let row_differs = |y: usize, reference: u32| (0..w).any(|x| key(x, y) != reference);

    let top_left = key(0, 0);
    let top_right = key(w - 1, 0);
    let bottom_left = key(0, h - 1);

    let mut left = (0..w).find(|&x| column_differs(x, top_left)).unwrap_or(0);
    let mut right = (0..w)
        .rev()
        .find(|&x| column_differs(x, top_right))
        .unwrap_or(w - 1);
    let mut top = (0..h).find(|&y| row_differs(y, top_left)).unwrap_or(0);
    let mut bottom = (0..h)
        .rev()
        .find(|&y| row_differs(y, bottom_left))
        .unwrap_or(h - 1);

    if left > right {
        left = 0;
        right = w - 1;
    }
    if top > bottom {
        top = 0;
        bottom = h - 1;
    }

    let box_width = if left == right { w } else { right - left + 1 };
    let box_height = if top == bottom { h } else { bottom - top + 1 };

    BoundingBox {
        left: left as u32,
        right: right as u32,
        top: top as u32,
        bottom: bottom as u32,
        width: box_width as u32,
        height: box_height as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
        px.repeat((width * height) as usize)
    }

    fn put(pixels: &mut [u8], width: u32, x: u32, y: u32, px: [u8; 4]) {
        let i = ((y * width + x) * 4) as usize;
        pixels[i..i + 4].copy_from_slice(&px);
    }

    #[test]
    fn test_uniform_image_is_full_frame() {
        let pixels = solid(10, 6, [12, 34, 56, 255]);
        let bb = find_borders(&pixels, 10, 6, AlphaMode::Full, AlphaThreshold::default());
        assert_eq!(bb, BoundingBox::full(10, 6));
    }

    #[test]
    fn test_centered_content() {
        let mut pixels = solid(8, 8, [0, 0, 0, 0]);
        for y in 2..5 {
            for x in 3..6 {
                put(&mut pixels, 8, x, y, [255, 0, 0, 255]);
            }
        }
        let bb = find_borders(&pixels, 8, 8, AlphaMode::Full, AlphaThreshold::default());
        assert_eq!((bb.left, bb.right, bb.top, bb.bottom), (3, 5, 2, 4));
        assert_eq!((bb.width, bb.height), (3, 3));
        assert_eq!(bb.crop_rect(8, 8), (3, 2, 3, 3));
    }

    #[test]
    fn test_opaque_ring_on_transparent_interior() {
        let ring = |interior: [u8; 4]| {
            let mut pixels = solid(6, 6, interior);
            for i in 0..6 {
                put(&mut pixels, 6, i, 0, [9, 9, 9, 255]);
                put(&mut pixels, 6, i, 5, [9, 9, 9, 255]);
                put(&mut pixels, 6, 0, i, [9, 9, 9, 255]);
                put(&mut pixels, 6, 5, i, [9, 9, 9, 255]);
            }
            pixels
        };
        let th = AlphaThreshold::default();

        // Interior below threshold differs from the ring, so each scan stops
        // one pixel in
        let bb = find_borders(&ring([0, 0, 0, 0]), 6, 6, AlphaMode::Threshold, th);
        assert_eq!((bb.left, bb.right, bb.top, bb.bottom), (1, 4, 1, 4));
        assert_eq!((bb.width, bb.height), (4, 4));

        // Same colour at or above threshold is indistinguishable from the ring
        let bb = find_borders(&ring([9, 9, 9, 128]), 6, 6, AlphaMode::Threshold, th);
        assert_eq!(bb, BoundingBox::full(6, 6));
    }

    #[test]
    fn test_threshold_mode_merges_transparent_colours() {
        // Transparent pixels of different colour are one key under Threshold
        let mut pixels = solid(4, 4, [200, 10, 10, 20]);
        put(&mut pixels, 4, 3, 3, [10, 200, 10, 100]);
        put(&mut pixels, 4, 1, 1, [10, 10, 10, 255]);

        let bb = find_borders(&pixels, 4, 4, AlphaMode::Threshold, AlphaThreshold::default());
        // Single column and row report the full frame extent
        assert_eq!((bb.left, bb.right, bb.top, bb.bottom), (1, 1, 1, 1));
        assert_eq!((bb.width, bb.height), (4, 4));

        let bb = find_borders(&pixels, 4, 4, AlphaMode::Full, AlphaThreshold::default());
        assert_eq!((bb.left, bb.right, bb.top, bb.bottom), (1, 3, 1, 3));
    }

    #[test]
    fn test_none_mode_ignores_alpha() {
        let mut pixels = solid(4, 2, [5, 5, 5, 255]);
        put(&mut pixels, 4, 2, 1, [5, 5, 5, 0]);
        let bb = find_borders(&pixels, 4, 2, AlphaMode::None, AlphaThreshold::default());
        assert_eq!(bb, BoundingBox::full(4, 2));
    }

    #[test]
    fn test_crossing_edges_fall_back_to_full_width() {
        // Left half one colour, right half another: the left scan stops at
        // column 2, the right scan at column 1
        let mut pixels = solid(4, 2, [0, 0, 0, 255]);
        for y in 0..2 {
            put(&mut pixels, 4, 2, y, [1, 1, 1, 255]);
            put(&mut pixels, 4, 3, y, [1, 1, 1, 255]);
        }
        let bb = find_borders(&pixels, 4, 2, AlphaMode::Full, AlphaThreshold::default());
        assert_eq!((bb.left, bb.right, bb.width), (0, 3, 4));
        assert_eq!((bb.top, bb.bottom, bb.height), (0, 1, 2));
    }

    #[test]
    fn test_empty_and_short_input() {
        let th = AlphaThreshold::default();
        assert_eq!(find_borders(&[], 0, 4, AlphaMode::Full, th), BoundingBox::default());
        assert_eq!(find_borders(&[0; 8], 2, 2, AlphaMode::Full, th), BoundingBox::default());
    }

    #[test]
    fn test_union() {
        let a = BoundingBox {
            left: 2,
            right: 5,
            top: 1,
            bottom: 3,
            width: 4,
            height: 3,
        };
        let b = BoundingBox {
            left: 1,
            right: 4,
            top: 2,
            bottom: 6,
            width: 4,
            height: 5,
        };
        let u = a + b;
        assert_eq!((u.left, u.right, u.top, u.bottom), (1, 5, 1, 6));
        assert_eq!((u.width, u.height), (4, 5));

        let mut acc = BoundingBox::default();
        acc += a;
        assert_eq!(acc, a);
    }

    #[test]
    fn test_alpha_mode_for_format() {
        assert_eq!(AlphaMode::for_format(PixelFormat::Dxt5), AlphaMode::Full);
        assert_eq!(AlphaMode::for_format(PixelFormat::Dxt1A), AlphaMode::Threshold);
        assert_eq!(AlphaMode::for_format(PixelFormat::Bgr888), AlphaMode::Threshold);
    }

    #[test]
    fn test_crop_rect_clamps() {
        let bb = BoundingBox {
            left: 6,
            right: 9,
            top: 0,
            bottom: 3,
            width: 10,
            height: 4,
        };
        assert_eq!(bb.crop_rect(8, 4), (6, 0, 2, 4));
        assert_eq!(BoundingBox::default().crop_rect(8, 4), (0, 0, 8, 4));
    }
}
