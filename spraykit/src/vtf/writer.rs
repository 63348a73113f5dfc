//! The container writer.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::EncodeError;
use super::header::VtfHeader;
use super::progress::{EncodeProgress, EncodeStage};
use crate::border::{find_borders, AlphaMode, BoundingBox};
use crate::codec;
use crate::compress::{default_helper_threads, BlockCompressor, IntelBlockCompressor, MAX_HELPER_THREADS};
use crate::format::PixelFormat;
use crate::job::{AutocropMode, EncodingJob, JobError};
use crate::size;
use crate::source::{fit_and_letterbox, flatten_alpha, RasterFrame};

/// Encodes jobs into VTF 7.1 containers.
///
/// Block formats go through the [`BlockCompressor`]; every other format goes
/// through the pixel codec.
///
/// # Example
///
/// ```
/// use spraykit::format::PixelFormat;
/// use spraykit::job::EncodingJob;
/// use spraykit::source::RasterFrame;
/// use spraykit::vtf::{ContainerWriter, NoProgress};
///
/// let mut job = EncodingJob::new(PixelFormat::Rgba8888).with_resolution(16, 16);
/// job.import(vec![RasterFrame::filled(8, 8, [0, 128, 255, 255]).unwrap()], 0, 0);
/// job.recompute();
///
/// let bytes = ContainerWriter::default().encode(&job, &mut NoProgress).unwrap();
/// assert_eq!(bytes.len() as u64, job.file_size());
/// assert_eq!(&bytes[..4], b"VTF\0");
/// ```
#[derive(Clone)]
pub struct ContainerWriter {
    compressor: Arc<dyn BlockCompressor>,
    helper_threads: usize,
}

impl ContainerWriter {
    /// Creates a writer around a block compressor.
    ///
    /// # Arguments
    ///
    /// * `compressor` - Codec for the DXT formats; pixel formats never reach it
    ///
    /// Helper threads default to [`default_helper_threads`].
    pub fn new(compressor: Arc<dyn BlockCompressor>) -> Self {
        Self {
            compressor,
            helper_threads: default_helper_threads(),
        }
    }

    /// Sets the compressor's helper thread count, at most
    /// [`MAX_HELPER_THREADS`]. Zero compresses on the calling thread.
    pub fn with_helper_threads(mut self, threads: usize) -> Self {
        self.helper_threads = threads.min(MAX_HELPER_THREADS);
        self
    }

    pub fn helper_threads(&self) -> usize {
        self.helper_threads
    }

    /// Encodes `job` into a buffer of exactly `job.file_size()` bytes.
    ///
    /// The job must be recomputed and valid. Mip levels are written smallest
    /// first, frames in ascending order within each level.
    ///
    /// # Arguments
    ///
    /// * `job` - A job after [`EncodingJob::recompute`]
    /// * `progress` - Receives stage changes, image counts and codec progress
    ///
    /// # Errors
    ///
    /// * [`EncodeError::Configuration`] / [`EncodeError::Input`] when the job
    ///   fails validation
    /// * [`EncodeError::ExternalCodec`] when the block compressor fails
    /// * [`EncodeError::Consistency`] when the body does not match the
    ///   precomputed size
    ///
    /// The observer sees [`EncodeStage::Failed`] before any error returns.
    pub fn encode(
        &self,
        job: &EncodingJob,
        progress: &mut dyn EncodeProgress,
    ) -> Result<Vec<u8>, EncodeError> {
        match self.encode_stages(job, progress) {
            Ok(bytes) => {
                enter(progress, EncodeStage::Written);
                Ok(bytes)
            }
            Err(err) => {
                warn!(error = %err, "Encode failed");
                enter(progress, EncodeStage::Failed);
                Err(err)
            }
        }
    }

    /// Encodes `job` and writes it to `path`.
    ///
    /// The data goes to `path` with `.tmp` appended first and is renamed into
    /// place, so `path` is either the complete texture or untouched. Missing
    /// parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `job` - A job after [`EncodingJob::recompute`]
    /// * `path` - Destination file, replaced if it exists
    /// * `progress` - As for [`encode`](Self::encode)
    ///
    /// # Returns
    ///
    /// The number of bytes written, always `job.file_size()`.
    ///
    /// # Errors
    ///
    /// Everything [`encode`](Self::encode) returns, plus [`EncodeError::Io`]
    /// naming the file that could not be written or renamed.
    pub fn write_to(
        &self,
        job: &EncodingJob,
        path: &Path,
        progress: &mut dyn EncodeProgress,
    ) -> Result<u64, EncodeError> {
        let bytes = self.encode(job, progress)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(EncodeError::io(parent))?;
        }

        let temp_path = temp_path_for(path);
        if let Err(err) = fs::write(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(EncodeError::io(&temp_path)(err));
        }
        if let Err(err) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(EncodeError::io(path)(err));
        }

        info!(path = %path.display(), bytes = bytes.len(), "Texture written");
        Ok(bytes.len() as u64)
    }

    fn encode_stages(
        &self,
        job: &EncodingJob,
        progress: &mut dyn EncodeProgress,
    ) -> Result<Vec<u8>, EncodeError> {
        enter(progress, EncodeStage::Sizing);
        job.validate()?;

        let format = job.format();
        let (width, height) = job.resolution();
        let (mipmaps, frames) = (job.mipmaps(), job.frames());
        let expected = size::file_size(format, width, height, mipmaps, frames);
        let capacity = usize::try_from(expected).map_err(|_| {
            EncodeError::Input(format!("{} byte texture does not fit in memory", expected))
        })?;

        info!(
            format = %format,
            width,
            height,
            mipmaps,
            frames,
            bytes = expected,
            "Encoding texture"
        );

        enter(progress, EncodeStage::Allocating);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&VtfHeader::for_job(job).to_bytes());

        let total_images = mipmaps * frames;
        let mut done = 0;

        for mipmap in (0..mipmaps).rev() {
            let mip_width = size::mip_dimension(width, mipmap);
            let mip_height = size::mip_dimension(height, mipmap);
            let sources = level_sources(job, mipmap)?;
            let bounded = bounded_box(job, mipmap, &sources);

            for (frame, source) in sources.iter().enumerate() {
                let frame = frame as u32;
                enter(progress, EncodeStage::Encoding { mipmap, frame });

                let prepared = prepare_frame(job, source, bounded, mip_width, mip_height);
                let encoded = self.encode_image(job, &prepared, progress)?;
                out.extend_from_slice(&encoded);

                done += 1;
                progress.on_image(done, total_images);
            }
        }

        enter(progress, EncodeStage::Finalizing);
        let actual = out.len() as u64;
        if actual != expected {
            return Err(EncodeError::Consistency { expected, actual });
        }

        Ok(out)
    }

    fn encode_image(
        &self,
        job: &EncodingJob,
        frame: &RasterFrame,
        progress: &mut dyn EncodeProgress,
    ) -> Result<Vec<u8>, EncodeError> {
        let format = job.format();
        let (width, height) = frame.dimensions();

        if format.is_block_compressed() {
            let mut report = |percent: u32| progress.on_codec(percent);
            let blocks = self.compressor.compress(
                frame.pixels(),
                width,
                height,
                format,
                self.helper_threads,
                &mut report,
            )?;
            Ok(blocks)
        } else {
            let count = width as usize * height as usize;
            Ok(codec::convert(frame.pixels(), count, format, job.alpha_threshold())?)
        }
    }
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self::new(Arc::new(IntelBlockCompressor::new()))
    }
}

impl fmt::Debug for ContainerWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("compressor", &self.compressor.name())
            .field("helper_threads", &self.helper_threads)
            .finish()
    }
}

fn enter(progress: &mut dyn EncodeProgress, stage: EncodeStage) {
    debug!(stage = %stage, "Writer stage");
    progress.on_stage(stage);
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn level_sources(job: &EncodingJob, mipmap: u32) -> Result<Vec<&RasterFrame>, EncodeError> {
    job.sources()
        .level(mipmap)
        .iter()
        .enumerate()
        .map(|(frame, slot)| {
            slot.as_deref().ok_or_else(|| {
                EncodeError::from(JobError::MissingSource {
                    mipmap,
                    frame: frame as u32,
                })
            })
        })
        .collect()
}

fn borders_of(frame: &RasterFrame, job: &EncodingJob) -> BoundingBox {
    find_borders(
        frame.pixels(),
        frame.width(),
        frame.height(),
        AlphaMode::for_format(job.format()),
        job.alpha_threshold(),
    )
}

/// The union crop box shared by every frame of a level, if the autocrop mode
/// calls for one.
fn bounded_box(job: &EncodingJob, mipmap: u32, sources: &[&RasterFrame]) -> Option<BoundingBox> {
    let forced = match job.autocrop() {
        AutocropMode::Automatic => false,
        AutocropMode::BoundingBox => true,
        AutocropMode::Individual | AutocropMode::None => return None,
    };

    let first = sources.first()?.dimensions();
    if !forced && sources.iter().any(|f| f.dimensions() != first) {
        warn!(
            mipmap,
            "Frames differ in size, cropping each frame to its own borders"
        );
        return None;
    }

    Some(
        sources
            .iter()
            .fold(BoundingBox::default(), |union, frame| union + borders_of(frame, job)),
    )
}

/// Crops, fits and letterboxes one source to the mip size, then hard-edges
/// alpha for formats without graded transparency.
fn prepare_frame(
    job: &EncodingJob,
    source: &RasterFrame,
    bounded: Option<BoundingBox>,
    width: u32,
    height: u32,
) -> RasterFrame {
    let cropped = match job.autocrop() {
        AutocropMode::None => None,
        _ => {
            let bbox = bounded.unwrap_or_else(|| borders_of(source, job));
            let (x, y, w, h) = bbox.crop_rect(source.width(), source.height());
            debug!(x, y, width = w, height = h, "Crop");
            Some(source.crop(x, y, w, h))
        }
    };
    let cropped = cropped.as_ref().unwrap_or(source);

    let fitted = fit_and_letterbox(cropped, width, height, job.background());
    if needs_alpha_fixup(job.format()) {
        flatten_alpha(fitted, job.background(), job.alpha_threshold())
    } else {
        fitted
    }
}

fn needs_alpha_fixup(format: PixelFormat) -> bool {
    !format.has_multi_bit_alpha()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::CompressError;
    use crate::job::{MipmapInputMode, TextureSampleMode};
    use crate::vtf::{NoProgress, VtfFlags, HEADER_SIZE};

    /// Fills each block with the image's top-left red value.
    struct TaggingCompressor;

    impl BlockCompressor for TaggingCompressor {
        fn compress(
            &self,
            pixels: &[u8],
            width: u32,
            height: u32,
            format: PixelFormat,
            _helper_threads: usize,
            progress: &mut dyn FnMut(u32),
        ) -> Result<Vec<u8>, CompressError> {
            progress(100);
            let blocks = width.div_ceil(4) as usize * height.div_ceil(4) as usize;
            Ok(vec![pixels[0]; blocks * format.bytes_per_block() as usize])
        }

        fn name(&self) -> &str {
            "tagging"
        }
    }

    struct FailingCompressor;

    impl BlockCompressor for FailingCompressor {
        fn compress(
            &self,
            _pixels: &[u8],
            _width: u32,
            _height: u32,
            _format: PixelFormat,
            _helper_threads: usize,
            _progress: &mut dyn FnMut(u32),
        ) -> Result<Vec<u8>, CompressError> {
            Err(CompressError::Failed("out of cheese".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct Recorder {
        stages: Vec<EncodeStage>,
        images: Vec<(u32, u32)>,
        codec: Vec<u32>,
    }

    impl EncodeProgress for Recorder {
        fn on_stage(&mut self, stage: EncodeStage) {
            self.stages.push(stage);
        }

        fn on_image(&mut self, done: u32, total: u32) {
            self.images.push((done, total));
        }

        fn on_codec(&mut self, percent: u32) {
            self.codec.push(percent);
        }
    }

    fn solid(tag: u8) -> RasterFrame {
        RasterFrame::filled(8, 8, [tag, 0, 0, 255]).unwrap()
    }

    fn writer() -> ContainerWriter {
        ContainerWriter::new(Arc::new(TaggingCompressor)).with_helper_threads(0)
    }

    #[test]
    fn test_levels_smallest_first_frames_ascending() {
        let mut job = EncodingJob::new(PixelFormat::Dxt5)
            .with_resolution(8, 8)
            .with_mipmaps(2)
            .with_autocrop(AutocropMode::None);
        job.import(vec![solid(10), solid(20)], 0, 0);
        job.import(
            vec![
                RasterFrame::filled(4, 4, [30, 0, 0, 255]).unwrap(),
                RasterFrame::filled(4, 4, [40, 0, 0, 255]).unwrap(),
            ],
            1,
            0,
        );
        job.recompute();

        let mut recorder = Recorder::default();
        let bytes = writer().encode(&job, &mut recorder).unwrap();
        assert_eq!(bytes.len() as u64, job.file_size());

        // Mip 1 is 4×4: one 16-byte block per frame, then mip 0 is 8×8
        let body = &bytes[HEADER_SIZE..];
        assert!(body[..16].iter().all(|&b| b == 30));
        assert!(body[16..32].iter().all(|&b| b == 40));
        assert!(body[32..96].iter().all(|&b| b == 10));
        assert!(body[96..160].iter().all(|&b| b == 20));

        assert_eq!(recorder.images, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert_eq!(recorder.codec, vec![100; 4]);
        assert_eq!(recorder.stages.first(), Some(&EncodeStage::Sizing));
        assert_eq!(
            recorder.stages[2],
            EncodeStage::Encoding {
                mipmap: 1,
                frame: 0
            }
        );
        assert_eq!(recorder.stages.last(), Some(&EncodeStage::Written));
    }

    #[test]
    fn test_one_thread_pool_per_encode() {
        let compressor = Arc::new(IntelBlockCompressor::new());
        let writer = ContainerWriter::new(compressor.clone()).with_helper_threads(2);

        let mut job = EncodingJob::new(PixelFormat::Dxt1)
            .with_resolution(16, 16)
            .with_mipmap_input(MipmapInputMode::MaxOnly)
            .with_autocrop(AutocropMode::None);
        job.import((0..4).map(solid).collect(), 0, 0);
        job.recompute();
        assert_eq!((job.mipmaps(), job.frames()), (5, 4));

        let bytes = writer.encode(&job, &mut NoProgress).unwrap();
        assert_eq!(bytes.len() as u64, job.file_size());
        assert_eq!(compressor.pools_built(), 1);

        writer.encode(&job, &mut NoProgress).unwrap();
        assert_eq!(compressor.pools_built(), 1);
    }

    #[test]
    fn test_header_matches_job() {
        let mut job = EncodingJob::new(PixelFormat::Bgr888)
            .with_resolution(4, 2)
            .with_sample_mode(TextureSampleMode::PointSample);
        job.import(vec![solid(1)], 0, 0);
        job.recompute();

        let bytes = writer().encode(&job, &mut NoProgress).unwrap();
        let header = VtfHeader::from_bytes(&bytes).unwrap();
        assert_eq!((header.width, header.height), (4, 2));
        assert_eq!(header.frames, 1);
        assert_eq!(header.mipmaps, 1);
        assert_eq!(header.format, 3);
        assert!(header.flags.contains(VtfFlags::NOMIP | VtfFlags::POINTSAMPLE));
        assert_eq!(bytes.len(), HEADER_SIZE + 4 * 2 * 3);
    }

    #[test]
    fn test_pixel_codec_output_is_letterboxed_and_flattened() {
        // A red square on a 2×4 target: one background row above and below
        let mut job = EncodingJob::new(PixelFormat::Rgb888)
            .with_resolution(2, 4)
            .with_background([0, 0, 255, 255])
            .with_autocrop(AutocropMode::None);
        job.import(vec![RasterFrame::filled(2, 2, [255, 0, 0, 255]).unwrap()], 0, 0);
        job.recompute();

        let bytes = writer().encode(&job, &mut NoProgress).unwrap();
        let body = &bytes[HEADER_SIZE..];
        // Row 0 background
        assert_eq!(&body[0..3], &[0, 0, 255]);
        // Rows 1 and 2 hold the bar
        assert_eq!(&body[6..9], &[255, 0, 0]);
        assert_eq!(&body[12..15], &[255, 0, 0]);
        // Row 3 background
        assert_eq!(&body[18..21], &[0, 0, 255]);
    }

    #[test]
    fn test_autocrop_removes_uniform_border() {
        // White 1-pixel frame around a red 2×2 centre
        let mut pixels = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                pixels.extend_from_slice(if inside {
                    &[255, 0, 0, 255]
                } else {
                    &[255, 255, 255, 255]
                });
            }
        }
        let source = RasterFrame::new(4, 4, pixels).unwrap();

        let mut job = EncodingJob::new(PixelFormat::Rgba8888).with_resolution(2, 2);
        job.import(vec![source], 0, 0);
        job.recompute();

        let bytes = writer().encode(&job, &mut NoProgress).unwrap();
        let body = &bytes[HEADER_SIZE..];
        for px in body.chunks_exact(4) {
            assert_eq!(px, &[255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_mismatched_frames_fall_back_to_individual_crops() {
        let mut job = EncodingJob::new(PixelFormat::I8).with_resolution(4, 4);
        job.import(
            vec![RasterFrame::filled(4, 4, [9, 9, 9, 255]).unwrap(), RasterFrame::filled(2, 6, [9, 9, 9, 255]).unwrap()],
            0,
            0,
        );
        job.recompute();
        let sources = level_sources(&job, 0).unwrap();
        assert!(bounded_box(&job, 0, &sources).is_none());

        let forced = job.clone().with_autocrop(AutocropMode::BoundingBox);
        assert!(bounded_box(&forced, 0, &sources).is_some());
    }

    #[test]
    fn test_max_mipmaps_dxt1a_size() {
        let mut job = EncodingJob::new(PixelFormat::Dxt1A)
            .with_resolution(64, 64)
            .with_mipmap_input(MipmapInputMode::MaxOnly);
        job.import(vec![solid(5)], 0, 0);
        job.recompute();
        assert_eq!(job.mipmaps(), 7);

        let bytes = writer().encode(&job, &mut NoProgress).unwrap();
        assert_eq!(bytes.len() as u64, job.file_size());
    }

    #[test]
    fn test_invalid_job_fails_before_encoding() {
        let job = EncodingJob::new(PixelFormat::Dxt1).with_resolution(4, 4);
        let mut recorder = Recorder::default();
        let err = writer().encode(&job, &mut recorder).unwrap_err();
        assert!(matches!(err, EncodeError::Input(_)));
        assert_eq!(
            recorder.stages,
            vec![EncodeStage::Sizing, EncodeStage::Failed]
        );
    }

    #[test]
    fn test_compressor_failure_is_external() {
        let mut job = EncodingJob::new(PixelFormat::Dxt1).with_resolution(4, 4);
        job.import(vec![solid(1)], 0, 0);
        job.recompute();
        let writer = ContainerWriter::new(Arc::new(FailingCompressor));
        let err = writer.encode(&job, &mut NoProgress).unwrap_err();
        assert!(matches!(err, EncodeError::ExternalCodec(_)));
    }

    #[test]
    fn test_write_to_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spray.vtf");

        let mut job = EncodingJob::new(PixelFormat::Dxt1).with_resolution(4, 4);
        job.import(vec![solid(1)], 0, 0);
        job.recompute();

        let written = writer().write_to(&job, &path, &mut NoProgress).unwrap();
        assert_eq!(written, 64 + 8);
        assert_eq!(fs::read(&path).unwrap().len(), 72);
        assert!(!temp_path_for(&path).exists());

        let failing = ContainerWriter::new(Arc::new(FailingCompressor));
        let other = dir.path().join("other.vtf");
        assert!(failing.write_to(&job, &other, &mut NoProgress).is_err());
        assert!(!other.exists());
        assert!(!temp_path_for(&other).exists());
    }

    #[test]
    fn test_helper_threads_clamped() {
        let writer = writer().with_helper_threads(64);
        assert_eq!(writer.helper_threads(), MAX_HELPER_THREADS);
    }

    #[test]
    fn test_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContainerWriter>();
    }
}
