//! Encoding jobs: everything the container writer needs for one texture.
//!
//! An [`EncodingJob`] carries the output parameters plus a [`SourceGrid`] of
//! images. Derived values (automatic resolution, automatic mip count, exact
//! file size) are not kept in sync implicitly; call
//! [`EncodingJob::recompute`] after changing inputs.
//!
//! # Example
//!
//! ```
//! use spraykit::format::PixelFormat;
//! use spraykit::job::{EncodingJob, MipmapInputMode};
//! use spraykit::source::RasterFrame;
//!
//! let mut job = EncodingJob::new(PixelFormat::Dxt1A)
//!     .with_max_file_size(512 * 1024)
//!     .with_mipmap_input(MipmapInputMode::MaxOnly);
//! job.import(vec![RasterFrame::filled(300, 200, [255, 0, 0, 255]).unwrap()], 0, 0);
//! job.recompute();
//!
//! assert_eq!(job.resolution(), (512, 512));
//! assert_eq!(job.mipmaps(), 10);
//! assert!(job.file_size() <= 512 * 1024);
//! job.validate().unwrap();
//! ```

mod grid;
mod modes;

pub use grid::SourceGrid;
pub use modes::{
    AutocropMode, MipmapInputMode, MipmapPropagation, ModeParseError, ResolutionInputMode,
    TextureSampleMode,
};

use thiserror::Error;
use tracing::debug;

use crate::alpha::AlphaThreshold;
use crate::codec;
use crate::format::{PixelFormat, SourceLayout};
use crate::size::{self, ResolutionConstraints, MAX_RESOLUTION};
use crate::source::RasterFrame;
use crate::vtf::HEADER_SIZE;

/// Default file size budget, the limit most games place on sprays.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 512 * 1024;

/// Reasons a job cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("{0} has no source channel layout; this should never happen")]
    InvalidLayout(PixelFormat),

    #[error("{0} cannot be encoded")]
    UnsupportedFormat(PixelFormat),

    #[error("Invalid resolution {width}×{height}: both sides must be 1..=65535")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid mipmap count {mipmaps}: {width}×{height} allows 1..={max}")]
    InvalidMipmapCount {
        mipmaps: u32,
        max: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid frame count {0}: must be 1..=65535")]
    InvalidFrameCount(u32),

    #[error("No source image for mipmap {mipmap}, frame {frame}")]
    MissingSource { mipmap: u32, frame: u32 },
}

impl JobError {
    /// True for faults in the format tables rather than in the job.
    pub fn is_configuration(&self) -> bool {
        matches!(self, JobError::InvalidLayout(_))
    }
}

/// Parameters and sources for one texture.
///
/// Built with the `with_*` methods, filled through [`import`](Self::import),
/// then brought up to date with [`recompute`](Self::recompute) and checked
/// with [`validate`](Self::validate) before it is handed to the container
/// writer. Cloning is cheap: source images are shared.
#[derive(Debug, Clone)]
pub struct EncodingJob {
    width: u32,
    height: u32,
    format: PixelFormat,
    sources: SourceGrid,
    autocrop: AutocropMode,
    background: [u8; 4],
    alpha_threshold: AlphaThreshold,
    sample_mode: TextureSampleMode,
    mipmap_input: MipmapInputMode,
    resolution_input: ResolutionInputMode,
    propagation: MipmapPropagation,
    max_file_size: u64,
    file_size: u64,
}

impl EncodingJob {
    /// A one-frame, one-mip job with automatic resolution and a transparent
    /// black background.
    ///
    /// # Arguments
    ///
    /// * `format` - Output pixel format
    ///
    /// The budget starts at [`DEFAULT_MAX_FILE_SIZE`]; the other settings
    /// take their mode defaults (automatic autocrop, anisotropic sampling,
    /// fill propagation, alpha threshold 128).
    pub fn new(format: PixelFormat) -> Self {
        Self {
            width: 0,
            height: 0,
            format,
            sources: SourceGrid::new(1, 1),
            autocrop: AutocropMode::default(),
            background: [0, 0, 0, 0],
            alpha_threshold: AlphaThreshold::default(),
            sample_mode: TextureSampleMode::default(),
            mipmap_input: MipmapInputMode::default(),
            resolution_input: ResolutionInputMode::default(),
            propagation: MipmapPropagation::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            file_size: 0,
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Fixes the base resolution and switches to manual resolution input.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self.resolution_input = ResolutionInputMode::Manual;
        self
    }

    pub fn with_resolution_input(mut self, mode: ResolutionInputMode) -> Self {
        self.resolution_input = mode;
        self
    }

    /// Fixes the mipmap count and switches to user mipmap input.
    pub fn with_mipmaps(mut self, mipmaps: u32) -> Self {
        self.mipmap_input = MipmapInputMode::UserOption;
        self.set_mipmap_count(mipmaps);
        self
    }

    pub fn with_mipmap_input(mut self, mode: MipmapInputMode) -> Self {
        self.mipmap_input = mode;
        self
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.set_frame_count(frames);
        self
    }

    pub fn with_autocrop(mut self, mode: AutocropMode) -> Self {
        self.autocrop = mode;
        self
    }

    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = rgba;
        self
    }

    pub fn with_alpha_threshold(mut self, threshold: AlphaThreshold) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    pub fn with_sample_mode(mut self, mode: TextureSampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    pub fn with_propagation(mut self, propagation: MipmapPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn set_mipmap_count(&mut self, mipmaps: u32) {
        let frames = self.sources.frames();
        self.sources.resize(mipmaps, frames, self.propagation);
    }

    pub fn set_frame_count(&mut self, frames: u32) {
        let mipmaps = self.sources.mipmaps();
        self.sources.resize(mipmaps, frames, self.propagation);
    }

    /// Imports decoded frames at `(mipmap, frame)`; see [`SourceGrid::import`].
    ///
    /// # Arguments
    ///
    /// * `images` - Frames to place at consecutive frame indices
    /// * `mipmap` - Level to import into, 0 being the largest
    /// * `frame` - Index of the first frame to replace
    ///
    /// # Returns
    ///
    /// The number of frames placed. The frame count grows to fit; smaller
    /// levels are filled according to the job's [`MipmapPropagation`].
    pub fn import(&mut self, images: Vec<RasterFrame>, mipmap: u32, frame: u32) -> u32 {
        self.sources.import(images, mipmap, frame, self.propagation)
    }

    /// Imports several files' frames back to back, starting at
    /// `(mipmap, frame)`.
    ///
    /// # Returns
    ///
    /// The frame index after the last one placed.
    ///
    /// # Example
    ///
    /// ```
    /// use spraykit::format::PixelFormat;
    /// use spraykit::job::EncodingJob;
    /// use spraykit::source::RasterFrame;
    ///
    /// let red = RasterFrame::filled(4, 4, [255, 0, 0, 255]).unwrap();
    /// let mut job = EncodingJob::new(PixelFormat::Rgba8888);
    /// let next = job.import_all([vec![red.clone(), red.clone()], vec![red]], 0, 0);
    /// assert_eq!(next, 3);
    /// assert_eq!(job.frames(), 3);
    /// ```
    pub fn import_all(
        &mut self,
        files: impl IntoIterator<Item = Vec<RasterFrame>>,
        mipmap: u32,
        frame: u32,
    ) -> u32 {
        let mut next = frame;
        for images in files {
            next += self.import(images, mipmap, next);
        }
        next
    }

    /// Recomputes the derived parameters.
    ///
    /// With automatic resolution the largest resolution whose file fits
    /// `max_file_size` is chosen; `MaxOnly` mipmap input searches with a full
    /// chain at every candidate. The mip count then follows the mipmap input
    /// mode and the file size is recalculated.
    pub fn recompute(&mut self) {
        if self.mipmap_input == MipmapInputMode::OneOnly {
            self.set_mipmap_count(1);
        }

        if self.resolution_input == ResolutionInputMode::Automatic {
            let search_mipmaps = match self.mipmap_input {
                MipmapInputMode::MaxOnly => 0,
                _ => self.mipmaps(),
            };
            let constraints = ResolutionConstraints::for_format(self.format, search_mipmaps);
            let budget = self.max_file_size.saturating_sub(HEADER_SIZE as u64);
            let (width, height) = size::solve_resolution_for_budget(
                self.format,
                search_mipmaps,
                self.frames(),
                budget,
                constraints,
            );
            self.width = width;
            self.height = height;
        }

        if self.mipmap_input == MipmapInputMode::MaxOnly {
            self.set_mipmap_count(size::max_mipmaps(self.width, self.height));
        }

        self.file_size = size::file_size(
            self.format,
            self.width,
            self.height,
            self.mipmaps(),
            self.frames(),
        );

        debug!(
            format = %self.format,
            width = self.width,
            height = self.height,
            mipmaps = self.mipmaps(),
            frames = self.frames(),
            file_size = self.file_size,
            "Recomputed job parameters"
        );
    }

    /// Checks the job can be encoded as it stands.
    ///
    /// # Errors
    ///
    /// In order of checking: [`JobError::InvalidLayout`] for a format with no
    /// conversion path, [`JobError::UnsupportedFormat`] for a catalogued
    /// format the codec cannot produce, [`JobError::InvalidResolution`],
    /// [`JobError::InvalidMipmapCount`], [`JobError::InvalidFrameCount`],
    /// then [`JobError::MissingSource`] for the first empty grid slot.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.format.source_layout() == SourceLayout::Invalid {
            return Err(JobError::InvalidLayout(self.format));
        }
        if !self.format.is_block_compressed() && !codec::is_supported(self.format) {
            return Err(JobError::UnsupportedFormat(self.format));
        }

        let (width, height) = self.resolution();
        if !(1..=MAX_RESOLUTION).contains(&width) || !(1..=MAX_RESOLUTION).contains(&height) {
            return Err(JobError::InvalidResolution { width, height });
        }

        let max = size::max_mipmaps(width, height);
        let mipmaps = self.mipmaps();
        if !(1..=max).contains(&mipmaps) {
            return Err(JobError::InvalidMipmapCount {
                mipmaps,
                max,
                width,
                height,
            });
        }

        let frames = self.frames();
        if !(1..=u32::from(u16::MAX)).contains(&frames) {
            return Err(JobError::InvalidFrameCount(frames));
        }

        if let Some(&(mipmap, frame)) = self.sources.missing_slots().first() {
            return Err(JobError::MissingSource { mipmap, frame });
        }

        Ok(())
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mipmaps(&self) -> u32 {
        self.sources.mipmaps()
    }

    pub fn frames(&self) -> u32 {
        self.sources.frames()
    }

    pub fn sources(&self) -> &SourceGrid {
        &self.sources
    }

    pub fn autocrop(&self) -> AutocropMode {
        self.autocrop
    }

    pub fn background(&self) -> [u8; 4] {
        self.background
    }

    pub fn alpha_threshold(&self) -> AlphaThreshold {
        self.alpha_threshold
    }

    pub fn sample_mode(&self) -> TextureSampleMode {
        self.sample_mode
    }

    pub fn mipmap_input(&self) -> MipmapInputMode {
        self.mipmap_input
    }

    pub fn resolution_input(&self) -> ResolutionInputMode {
        self.resolution_input
    }

    pub fn propagation(&self) -> MipmapPropagation {
        self.propagation
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// File size as of the last [`recompute`](Self::recompute).
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Whether the last computed file size is over the budget.
    pub fn exceeds_budget(&self) -> bool {
        self.file_size > self.max_file_size
    }
}
