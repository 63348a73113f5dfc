//! `spraykit formats`: list the output formats.

use clap::Args;
use spraykit::format::{AlphaClass, PixelFormat};

use crate::error::CliError;

/// Arguments for `spraykit formats`.
#[derive(Debug, Args)]
pub struct FormatsArgs {
    /// Include formats hidden from the simplified list
    #[arg(long)]
    pub all: bool,
}

/// Run the formats command.
pub fn run(args: FormatsArgs, simple_only: bool) -> Result<(), CliError> {
    let simple_only = simple_only && !args.all;

    println!("{:<20} {:<12} {:<9} Description", "Name", "Storage", "Alpha");
    for format in PixelFormat::selectable(simple_only) {
        println!("{}", format_row(format, simple_only));
    }
    Ok(())
}

fn format_row(format: PixelFormat, simple: bool) -> String {
    format!(
        "{:<20} {:<12} {:<9} {}",
        format.name(),
        storage(format),
        alpha_label(format.alpha_class()),
        format.display_name(simple)
    )
}

fn storage(format: PixelFormat) -> String {
    if format.is_block_compressed() {
        format!("{} B/block", format.bytes_per_block())
    } else {
        format!("{} B/pixel", format.bytes_per_pixel())
    }
}

fn alpha_label(alpha: AlphaClass) -> &'static str {
    match alpha {
        AlphaClass::None => "none",
        AlphaClass::OneBit => "1-bit",
        AlphaClass::MultiBit => "full",
    }
}
