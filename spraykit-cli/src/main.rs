//! Spraykit CLI - Command-line interface
//!
//! Encodes images and animations into VTF sprays and answers size questions
//! without encoding.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use spraykit::config::Settings;
use tracing::warn;

use commands::config::ConfigCommands;
use commands::encode::EncodeArgs;
use commands::formats::FormatsArgs;
use commands::size::{FitArgs, SizeArgs};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "spraykit", version, about = "Turn images into Source engine spray textures")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write a debug log to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode images into a VTF texture
    Encode(EncodeArgs),

    /// List output pixel formats
    Formats(FormatsArgs),

    /// Print the exact file size of a texture
    Size(SizeArgs),

    /// Print the largest resolution that fits a size budget
    Fit(FitArgs),

    /// View or change settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    let settings = load_settings();

    match command {
        Command::Encode(args) => commands::encode::run(args, &settings),
        Command::Formats(args) => commands::formats::run(args, settings.simple_formats),
        Command::Size(args) => commands::size::run_size(args),
        Command::Fit(args) => commands::size::run_fit(args),
        Command::Config(command) => commands::config::run(command, settings),
    }
}

/// Settings from disk, or the defaults when the file cannot be read.
fn load_settings() -> Settings {
    Settings::load().unwrap_or_else(|err| {
        warn!(error = %err, "Using default settings");
        Settings::default()
    })
}
