//! `spraykit size` and `spraykit fit`: file size arithmetic without encoding.

use clap::Args;
use spraykit::format::PixelFormat;
use spraykit::size::{self, ResolutionConstraints, MAX_RESOLUTION};
use spraykit::vtf::HEADER_SIZE;

use super::common::{format_size, invalid, parse_size, MipmapArg};
use crate::error::CliError;

/// Arguments for `spraykit size`.
#[derive(Debug, Args)]
pub struct SizeArgs {
    /// Pixel format
    #[arg(short, long)]
    pub format: PixelFormat,

    #[arg(long)]
    pub width: u32,

    #[arg(long)]
    pub height: u32,

    /// Mipmap count, or `auto` for a full chain
    #[arg(long, default_value = "1")]
    pub mipmaps: MipmapArg,

    #[arg(long, default_value_t = 1)]
    pub frames: u32,
}

/// Arguments for `spraykit fit`.
#[derive(Debug, Args)]
pub struct FitArgs {
    /// Pixel format
    #[arg(short, long)]
    pub format: PixelFormat,

    /// File size budget, e.g. 524288, 512k or 1m
    #[arg(long, value_parser = parse_size)]
    pub max_size: u64,

    /// Mipmap count, or `auto` for a full chain at every candidate
    #[arg(long, default_value = "1")]
    pub mipmaps: MipmapArg,

    #[arg(long, default_value_t = 1)]
    pub frames: u32,
}

/// Run the size command.
pub fn run_size(args: SizeArgs) -> Result<(), CliError> {
    for (name, value) in [("width", args.width), ("height", args.height)] {
        if !(1..=MAX_RESOLUTION).contains(&value) {
            return Err(invalid(format!("{} must be 1..={}", name, MAX_RESOLUTION)));
        }
    }

    let mipmaps = resolve_mipmaps(args.mipmaps, args.width, args.height)?;
    let bytes = size::file_size(args.format, args.width, args.height, mipmaps, args.frames);
    println!("{} bytes ({})", bytes, format_size(bytes));
    Ok(())
}

/// Run the fit command.
pub fn run_fit(args: FitArgs) -> Result<(), CliError> {
    let (width, height, mipmaps) = fit(&args);
    if width == 0 || height == 0 {
        return Err(invalid(format!(
            "no {} texture fits in {}",
            args.format,
            format_size(args.max_size)
        )));
    }

    let bytes = size::file_size(args.format, width, height, mipmaps, args.frames);
    println!(
        "{}×{}, {} mipmap(s): {} bytes ({})",
        width,
        height,
        mipmaps,
        bytes,
        format_size(bytes)
    );
    Ok(())
}

/// Resolution and mip count the budget search picks.
fn fit(args: &FitArgs) -> (u32, u32, u32) {
    let search_mipmaps = match args.mipmaps {
        MipmapArg::Auto => 0,
        MipmapArg::Count(count) => count,
    };
    let constraints = ResolutionConstraints::for_format(args.format, search_mipmaps);
    let budget = args.max_size.saturating_sub(HEADER_SIZE as u64);
    let (width, height) = size::solve_resolution_for_budget(
        args.format,
        search_mipmaps,
        args.frames,
        budget,
        constraints,
    );
    let mipmaps = match args.mipmaps {
        MipmapArg::Auto => size::max_mipmaps(width, height),
        MipmapArg::Count(count) => count,
    };
    (width, height, mipmaps)
}

fn resolve_mipmaps(arg: MipmapArg, width: u32, height: u32) -> Result<u32, CliError> {
    let max = size::max_mipmaps(width, height);
    match arg {
        MipmapArg::Auto => Ok(max),
        MipmapArg::Count(count) if count <= max => Ok(count),
        MipmapArg::Count(count) => Err(invalid(format!(
            "{}×{} allows at most {} mipmaps, got {}",
            width, height, max, count
        ))),
    }
}
