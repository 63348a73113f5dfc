//! [`ImageLoader`] backed by the `image` crate.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

use super::{ImageLoader, LoadError, RasterFrame};

/// Loads still images and animations from disk.
///
/// Animated GIF, APNG and WebP files yield one frame per animation frame,
/// already composited to the full canvas. Everything else yields a single
/// frame.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader;

impl FileImageLoader {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn decode_error(path: &Path) -> impl FnOnce(image::ImageError) -> LoadError + '_ {
        move |source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        }
    }

    fn collect<'a, D: AnimationDecoder<'a>>(
        decoder: D,
        path: &Path,
    ) -> Result<Vec<RasterFrame>, LoadError> {
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(Self::decode_error(path))?;
        frames
            .into_iter()
            .map(|frame| checked(frame.into_buffer()))
            .collect()
    }

    /// Frames of an animated file, or `None` when the file is a still image.
    fn load_animation(
        path: &Path,
        format: ImageFormat,
    ) -> Result<Option<Vec<RasterFrame>>, LoadError> {
        let frames = match format {
            ImageFormat::Gif => {
                let decoder =
                    GifDecoder::new(Self::open(path)?).map_err(Self::decode_error(path))?;
                Self::collect(decoder, path)?
            }
            ImageFormat::Png => {
                let decoder =
                    PngDecoder::new(Self::open(path)?).map_err(Self::decode_error(path))?;
                if !decoder.is_apng().map_err(Self::decode_error(path))? {
                    return Ok(None);
                }
                let decoder = decoder.apng().map_err(Self::decode_error(path))?;
                Self::collect(decoder, path)?
            }
            ImageFormat::WebP => {
                let decoder =
                    WebPDecoder::new(Self::open(path)?).map_err(Self::decode_error(path))?;
                if !decoder.has_animation() {
                    return Ok(None);
                }
                Self::collect(decoder, path)?
            }
            _ => return Ok(None),
        };
        Ok(Some(frames))
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<Vec<RasterFrame>, LoadError> {
        let reader = ImageReader::new(Self::open(path)?)
            .with_guessed_format()
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(format) = reader.format() {
            if let Some(frames) = Self::load_animation(path, format)? {
                if frames.is_empty() {
                    return Err(LoadError::NoFrames {
                        path: path.to_path_buf(),
                    });
                }
                debug!(
                    path = %path.display(),
                    frames = frames.len(),
                    "Loaded animation"
                );
                return Ok(frames);
            }
        }

        let image = reader.decode().map_err(Self::decode_error(path))?;
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded image"
        );
        Ok(vec![checked(image.into_rgba8())?])
    }
}

/// Converts a decoded buffer, rejecting empty images.
fn checked(image: RgbaImage) -> Result<RasterFrame, LoadError> {
    let (width, height) = image.dimensions();
    RasterFrame::new(width, height, image.into_raw())
}
