//! Spraykit - Raster images to Valve Texture Format
//!
//! This library turns still images and animations into VTF 7.1 textures
//! (sprays) that fit a file size budget.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │  source  │──▶│    job     │──▶│ vtf writer   │──▶│  .vtf on disk   │
//! │ (decode) │   │ (recompute)│   │ crop → fit → │   │  (atomic write) │
//! └──────────┘   └────────────┘   │ encode       │   └─────────────────┘
//!                                 └──────┬───────┘
//!                                ┌───────┴────────┐
//!                                ▼                ▼
//!                          ┌──────────┐     ┌──────────┐
//!                          │ compress │     │  codec   │
//!                          │ (DXTn)   │     │ (pixels) │
//!                          └──────────┘     └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use spraykit::format::PixelFormat;
//! use spraykit::job::EncodingJob;
//! use spraykit::source::{FileImageLoader, ImageLoader};
//! use spraykit::vtf::{ContainerWriter, NoProgress};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frames = FileImageLoader::new().load(Path::new("logo.gif"))?;
//!
//! let mut job = EncodingJob::new(PixelFormat::Dxt1A);
//! job.import(frames, 0, 0);
//! job.recompute();
//!
//! ContainerWriter::default().write_to(&job, Path::new("logo.vtf"), &mut NoProgress)?;
//! # Ok(())
//! # }
//! ```

pub mod alpha;
pub mod border;
pub mod codec;
pub mod compress;
pub mod config;
pub mod format;
pub mod job;
pub mod size;
pub mod source;
pub mod vtf;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
