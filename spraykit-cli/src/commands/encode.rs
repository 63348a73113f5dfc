//! `spraykit encode`: images in, VTF out.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use spraykit::alpha::AlphaThreshold;
use spraykit::config::Settings;
use spraykit::format::PixelFormat;
use spraykit::job::{EncodingJob, MipmapInputMode, MipmapPropagation};
use spraykit::source::{FileImageLoader, ImageLoader, RasterFrame};
use spraykit::vtf::{ContainerWriter, EncodeProgress, EncodeStage};
use tracing::{info, warn};

use super::common::{
    format_size, invalid, parse_colour, parse_size, AutocropArg, MipInput, MipmapArg,
    PropagationArg, SampleArg,
};
use crate::error::CliError;

/// Arguments for `spraykit encode`.
#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Input images; animation frames and further files are appended in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output texture path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Pixel format (see `spraykit formats`)
    #[arg(short, long)]
    pub format: Option<PixelFormat>,

    /// File size budget, e.g. 524288, 512k or 1m
    #[arg(long, value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Fixed width; disables the automatic resolution search
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Fixed height; disables the automatic resolution search
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Mipmap count, or `auto` for a full chain
    #[arg(long)]
    pub mipmaps: Option<MipmapArg>,

    /// How source images are cropped to their content
    #[arg(long, value_enum)]
    pub autocrop: Option<AutocropArg>,

    /// Texture filtering flags
    #[arg(long, value_enum)]
    pub sample: Option<SampleArg>,

    /// Letterbox colour as r,g,b[,a] or #rrggbb[aa]
    #[arg(long, value_parser = parse_colour, default_value = "0,0,0,0")]
    pub background: [u8; 4],

    /// Alpha below this counts as transparent (-1 disables, 256 makes all transparent)
    #[arg(long, allow_hyphen_values = true)]
    pub alpha_threshold: Option<i32>,

    /// Compressor helper threads (0 = compress on the main thread)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Extra image for a specific mip level, as FILE@LEVEL
    #[arg(long = "mip-input", value_name = "FILE@LEVEL")]
    pub mip_inputs: Vec<MipInput>,

    /// How an imported image fills smaller mip levels
    #[arg(long, value_enum, default_value = "fill")]
    pub propagation: PropagationArg,

    /// Write the texture even if it exceeds the size budget
    #[arg(long)]
    pub allow_oversize: bool,
}

/// Run the encode command.
pub fn run(args: EncodeArgs, settings: &Settings) -> Result<(), CliError> {
    let loader = FileImageLoader::new();
    let sources = args
        .inputs
        .iter()
        .map(|path| loader.load(path))
        .collect::<Result<Vec<Vec<RasterFrame>>, _>>()?;

    let mut job = build_job(&args, settings);
    let frames = job.import_all(sources, 0, 0);
    info!(frames, inputs = args.inputs.len(), "Loaded source images");
    job.recompute();

    if !args.mip_inputs.is_empty() {
        for input in &args.mip_inputs {
            if input.level >= job.mipmaps() {
                return Err(invalid(format!(
                    "{} targets mip level {}, but the texture has {} levels",
                    input.path.display(),
                    input.level,
                    job.mipmaps()
                )));
            }
            let images = loader.load(&input.path)?;
            job.import(images, input.level, 0);
        }
        job.recompute();
    }

    job.validate()?;

    if job.exceeds_budget() {
        let message = format!(
            "texture is {} but the budget is {}",
            format_size(job.file_size()),
            format_size(job.max_file_size())
        );
        if !args.allow_oversize {
            return Err(invalid(format!("{} (use --allow-oversize to write it anyway)", message)));
        }
        warn!("{}", message);
    }

    let threads = args.threads.unwrap_or(settings.helper_threads);
    let writer = ContainerWriter::default().with_helper_threads(threads);

    let mut progress = BarProgress::new(job.mipmaps() * job.frames());
    let written = writer.write_to(&job, &args.output, &mut progress);
    progress.finish();
    let written = written?;

    println!(
        "Wrote {}: {}×{} {}, {} mipmap(s), {} frame(s), {}",
        args.output.display(),
        job.width(),
        job.height(),
        job.format(),
        job.mipmaps(),
        job.frames(),
        format_size(written)
    );

    Ok(())
}

/// Job parameters from arguments, falling back to settings.
fn build_job(args: &EncodeArgs, settings: &Settings) -> EncodingJob {
    let format = args.format.unwrap_or(settings.format);
    let threshold = args
        .alpha_threshold
        .map(AlphaThreshold::new)
        .unwrap_or(settings.alpha_threshold);

    let mut job = EncodingJob::new(format)
        .with_max_file_size(args.max_size.unwrap_or(settings.max_file_size))
        .with_autocrop(args.autocrop.map(Into::into).unwrap_or(settings.autocrop))
        .with_sample_mode(args.sample.map(Into::into).unwrap_or(settings.sample_mode))
        .with_background(args.background)
        .with_alpha_threshold(threshold)
        .with_propagation(MipmapPropagation::from(args.propagation));

    job = match args.mipmaps {
        Some(MipmapArg::Auto) => job.with_mipmap_input(MipmapInputMode::MaxOnly),
        Some(MipmapArg::Count(count)) => job.with_mipmaps(count),
        None => job.with_mipmap_input(MipmapInputMode::OneOnly),
    };

    if let (Some(width), Some(height)) = (args.width, args.height) {
        job = job.with_resolution(width, height);
    }

    job
}

/// Shows encode progress on stderr.
struct BarProgress {
    bar: ProgressBar,
    stage: String,
}

impl BarProgress {
    fn new(images: u32) -> Self {
        let bar = ProgressBar::new(u64::from(images));
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} images {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            stage: String::new(),
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EncodeProgress for BarProgress {
    fn on_stage(&mut self, stage: EncodeStage) {
        self.stage = stage.to_string();
        self.bar.set_message(self.stage.clone());
    }

    fn on_image(&mut self, done: u32, total: u32) {
        self.bar.set_length(u64::from(total));
        self.bar.set_position(u64::from(done));
    }

    fn on_codec(&mut self, percent: u32) {
        self.bar.set_message(format!("{} ({}%)", self.stage, percent));
    }
}
