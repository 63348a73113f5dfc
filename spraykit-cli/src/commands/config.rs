//! Configuration management CLI commands.
//!
//! Provides `config show`, `config get`, `config set`, and `config path`.

use clap::Subcommand;
use spraykit::config::{config_file_path, ConfigKey, Settings};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show every setting
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., encoding.format)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., encoding.format)
        key: String,

        /// Value to set
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, settings: Settings) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            print!("{}", render(&settings));
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            println!("{}", key.get(&settings));
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut settings = settings;
            key.set(&mut settings, &value)?;
            settings.save()?;
            println!("Set {} = {}", key.name(), key.get(&settings));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'spraykit config show' to see available keys.",
            key
        ))
    })
}

/// Settings grouped by section, as `config show` prints them.
fn render(settings: &Settings) -> String {
    let mut out = String::new();
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        // Section header when the section changes
        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        out.push_str(&format!("  {} = {}\n", key.key_name(), key.get(settings)));
    }

    out
}
