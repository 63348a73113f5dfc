//! User settings persisted as an INI file.
//!
//! Settings live at `<config dir>/spraykit/config.ini`:
//!
//! ```ini
//! [encoding]
//! format = dxt1a
//! max_file_size = 524288
//! alpha_threshold = 128
//! helper_threads = 8
//! sample_mode = anisotropic
//! autocrop = automatic
//!
//! [display]
//! simple_formats = true
//! ```
//!
//! A missing file yields the defaults. Values that do not parse fall back to
//! their default with a warning; numbers outside their range are clamped.

mod keys;

pub use keys::ConfigKey;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use crate::alpha::AlphaThreshold;
use crate::compress::{default_helper_threads, MAX_HELPER_THREADS};
use crate::format::PixelFormat;
use crate::job::{AutocropMode, TextureSampleMode, DEFAULT_MAX_FILE_SIZE};

const APP_DIR: &str = "spraykit";
const FILE_NAME: &str = "config.ini";

/// Errors reading, writing or editing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Path of the settings file, falling back to the working directory when the
/// platform has no config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(FILE_NAME)
}

/// Encoding defaults and display preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub format: PixelFormat,
    pub max_file_size: u64,
    pub alpha_threshold: AlphaThreshold,
    pub helper_threads: usize,
    pub sample_mode: TextureSampleMode,
    pub autocrop: AutocropMode,
    /// Show only the simplified format list.
    pub simple_formats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: PixelFormat::Dxt1A,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            alpha_threshold: AlphaThreshold::default(),
            helper_threads: default_helper_threads(),
            sample_mode: TextureSampleMode::default(),
            autocrop: AutocropMode::default(),
            simple_formats: true,
        }
    }
}

impl Settings {
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_alpha_threshold(mut self, threshold: AlphaThreshold) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Sets the helper thread count, clamped to [`MAX_HELPER_THREADS`].
    pub fn with_helper_threads(mut self, threads: usize) -> Self {
        self.helper_threads = threads.min(MAX_HELPER_THREADS);
        self
    }

    pub fn with_sample_mode(mut self, mode: TextureSampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    pub fn with_autocrop(mut self, mode: AutocropMode) -> Self {
        self.autocrop = mode;
        self
    }

    pub fn with_simple_formats(mut self, simple: bool) -> Self {
        self.simple_formats = simple;
        self
    }

    /// Loads settings from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads settings from `path`; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|err| match err {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(parse) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: parse.to_string(),
            },
        })?;

        debug!(path = %path.display(), "Loaded settings");
        Ok(Self::from_ini(&ini))
    }

    /// Reads every known key, keeping the default for absent or bad values.
    pub fn from_ini(ini: &Ini) -> Self {
        let mut settings = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.apply_lenient(&mut settings, value);
            }
        }
        settings
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Saves to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes the settings to a temporary file next to `path`, then renames
    /// it into place.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let temp_path = path.with_extension("ini.tmp");
        self.to_ini()
            .write_to_file(&temp_path)
            .map_err(io_error(&temp_path))?;
        fs::rename(&temp_path, path).map_err(io_error(path))?;

        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}

/// Logs and discards a value that could not be applied.
fn reject(key: ConfigKey, value: &str, reason: impl std::fmt::Display) {
    warn!(key = key.name(), value, %reason, "Ignoring configuration value");
}
