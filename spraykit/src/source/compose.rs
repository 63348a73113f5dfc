//! Frame composition onto a fixed-size mip target.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::RasterFrame;
use crate::alpha::AlphaThreshold;

/// Largest size with the aspect ratio of `width` × `height` that fits in
/// `target_width` × `target_height`. Scales up as well as down.
pub fn fit_dimensions(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (target_width, target_height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (tw, th) = (u64::from(target_width), u64::from(target_height));

    // Compare tw/w against th/h without floating point
    if tw * h <= th * w {
        let fitted = (h * tw + w / 2) / w;
        (target_width, fitted.clamp(1, th) as u32)
    } else {
        let fitted = (w * th + h / 2) / h;
        (fitted.clamp(1, tw) as u32, target_height)
    }
}

/// Resizes `frame` to fit the target (Lanczos3), then centres it on a
/// target-sized canvas of `background`. The frame replaces the canvas pixels
/// it covers; nothing is blended.
pub fn fit_and_letterbox(
    frame: &RasterFrame,
    target_width: u32,
    target_height: u32,
    background: [u8; 4],
) -> RasterFrame {
    let (fit_w, fit_h) = fit_dimensions(
        frame.width(),
        frame.height(),
        target_width,
        target_height,
    );

    let source = frame.to_rgba_image();
    let resized = if (fit_w, fit_h) == frame.dimensions() {
        source
    } else {
        imageops::resize(&source, fit_w, fit_h, FilterType::Lanczos3)
    };

    if (fit_w, fit_h) == (target_width, target_height) {
        return RasterFrame::from(resized);
    }

    let mut canvas = RgbaImage::from_pixel(target_width, target_height, Rgba(background));
    let x = (target_width - fit_w) / 2;
    let y = (target_height - fit_h) / 2;
    imageops::replace(&mut canvas, &resized, i64::from(x), i64::from(y));
    RasterFrame::from(canvas)
}

/// Hard-edges alpha for formats without partial transparency.
///
/// Pixels below `threshold` become the background colour with alpha 0; all
/// others become fully opaque.
pub fn flatten_alpha(frame: RasterFrame, background: [u8; 4], threshold: AlphaThreshold) -> RasterFrame {
    frame.map_pixels(|px| {
        if threshold.is_below(px[3]) {
            px[..3].copy_from_slice(&background[..3]);
            px[3] = 0;
        } else {
            px[3] = u8::MAX;
        }
    })
}
