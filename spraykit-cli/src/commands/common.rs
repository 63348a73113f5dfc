//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use spraykit::job::{AutocropMode, MipmapPropagation, TextureSampleMode};

use crate::error::CliError;

/// Texture filtering selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SampleArg {
    /// Trilinear filtering
    Trilinear,
    /// Anisotropic filtering
    Anisotropic,
    /// Nearest-neighbour, only applied to textures without mipmaps
    Point,
    /// No filtering flags
    None,
}

impl From<SampleArg> for TextureSampleMode {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::Trilinear => TextureSampleMode::Trilinear,
            SampleArg::Anisotropic => TextureSampleMode::Anisotropic,
            SampleArg::Point => TextureSampleMode::PointSample,
            SampleArg::None => TextureSampleMode::None,
        }
    }
}

/// Autocrop selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum AutocropArg {
    /// One crop box per mip level, per frame when frame sizes differ
    Automatic,
    /// Crop every frame to its own content
    Individual,
    /// One crop box per mip level, even across frame sizes
    BoundingBox,
    /// Keep the whole image
    None,
}

impl From<AutocropArg> for AutocropMode {
    fn from(arg: AutocropArg) -> Self {
        match arg {
            AutocropArg::Automatic => AutocropMode::Automatic,
            AutocropArg::Individual => AutocropMode::Individual,
            AutocropArg::BoundingBox => AutocropMode::BoundingBox,
            AutocropArg::None => AutocropMode::None,
        }
    }
}

/// How an image imported into one mip level fills the smaller ones.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PropagationArg {
    /// Overwrite every smaller level
    Fill,
    /// Fill only smaller levels that have no image yet
    NoOverwrite,
    /// Leave other levels alone
    None,
}

impl From<PropagationArg> for MipmapPropagation {
    fn from(arg: PropagationArg) -> Self {
        match arg {
            PropagationArg::Fill => MipmapPropagation::Fill,
            PropagationArg::NoOverwrite => MipmapPropagation::NoOverwrite,
            PropagationArg::None => MipmapPropagation::None,
        }
    }
}

/// `--mipmaps` value: a fixed count or a full chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipmapArg {
    Auto,
    Count(u32),
}

impl FromStr for MipmapArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") || s.eq_ignore_ascii_case("max") {
            return Ok(MipmapArg::Auto);
        }
        match s.parse::<u32>() {
            Ok(0) => Err("mipmap count must be at least 1".to_string()),
            Ok(n) => Ok(MipmapArg::Count(n)),
            Err(_) => Err(format!("expected a number or 'auto', got '{}'", s)),
        }
    }
}

/// `--mip-input FILE@LEVEL`: an image placed at a specific mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipInput {
    pub path: PathBuf,
    pub level: u32,
}

impl FromStr for MipInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, level) = s
            .rsplit_once('@')
            .ok_or_else(|| format!("expected FILE@LEVEL, got '{}'", s))?;
        if path.is_empty() {
            return Err(format!("missing file name in '{}'", s));
        }
        let level = level
            .parse()
            .map_err(|_| format!("'{}' is not a mip level", level))?;
        Ok(MipInput {
            path: PathBuf::from(path),
            level,
        })
    }
}

/// Parses a background colour given as `r,g,b[,a]` or `#rrggbb[aa]`.
/// Alpha defaults to 255.
pub fn parse_colour(s: &str) -> Result<[u8; 4], String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_colour(hex).ok_or_else(|| format!("'{}' is not a hex colour", s));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(format!("expected r,g,b or r,g,b,a, got '{}'", s));
    }

    let mut rgba = [0, 0, 0, u8::MAX];
    for (channel, part) in rgba.iter_mut().zip(&parts) {
        *channel = part
            .parse()
            .map_err(|_| format!("'{}' is not a channel value (0-255)", part))?;
    }
    Ok(rgba)
}

fn parse_hex_colour(hex: &str) -> Option<[u8; 4]> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let mut rgba = [0, 0, 0, u8::MAX];
    for (i, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(rgba)
}

/// Parses a byte count with an optional `k`/`kb`/`kib`/`m`/`mb`/`mib` suffix
/// (binary multiples).
pub fn parse_size(s: &str) -> Result<u64, String> {
    let lower = s.trim().to_ascii_lowercase();
    let split = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (number, suffix) = lower.split_at(split);

    let number: u64 = number
        .parse()
        .map_err(|_| format!("'{}' is not a size", s))?;
    let multiplier = match suffix.trim() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1024,
        "m" | "mb" | "mib" => 1024 * 1024,
        other => return Err(format!("unknown size unit '{}'", other)),
    };

    number
        .checked_mul(multiplier)
        .filter(|&bytes| bytes > 0)
        .ok_or_else(|| format!("'{}' is not a usable size", s))
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;

    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Converts a clap value error message into a [`CliError`].
pub fn invalid(message: impl Into<String>) -> CliError {
    CliError::InvalidArgument(message.into())
}
