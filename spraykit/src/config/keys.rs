//! Addressable settings keys (`section.key`).

use std::str::FromStr;

use tracing::warn;

use super::{reject, ConfigError, Settings};
use crate::alpha::AlphaThreshold;
use crate::compress::MAX_HELPER_THREADS;

/// One settings entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    EncodingFormat,
    EncodingMaxFileSize,
    EncodingAlphaThreshold,
    EncodingHelperThreads,
    EncodingSampleMode,
    EncodingAutocrop,
    DisplaySimpleFormats,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::EncodingFormat,
            ConfigKey::EncodingMaxFileSize,
            ConfigKey::EncodingAlphaThreshold,
            ConfigKey::EncodingHelperThreads,
            ConfigKey::EncodingSampleMode,
            ConfigKey::EncodingAutocrop,
            ConfigKey::DisplaySimpleFormats,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::DisplaySimpleFormats => "display",
            _ => "encoding",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::EncodingFormat => "format",
            ConfigKey::EncodingMaxFileSize => "max_file_size",
            ConfigKey::EncodingAlphaThreshold => "alpha_threshold",
            ConfigKey::EncodingHelperThreads => "helper_threads",
            ConfigKey::EncodingSampleMode => "sample_mode",
            ConfigKey::EncodingAutocrop => "autocrop",
            ConfigKey::DisplaySimpleFormats => "simple_formats",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::EncodingFormat => "encoding.format",
            ConfigKey::EncodingMaxFileSize => "encoding.max_file_size",
            ConfigKey::EncodingAlphaThreshold => "encoding.alpha_threshold",
            ConfigKey::EncodingHelperThreads => "encoding.helper_threads",
            ConfigKey::EncodingSampleMode => "encoding.sample_mode",
            ConfigKey::EncodingAutocrop => "encoding.autocrop",
            ConfigKey::DisplaySimpleFormats => "display.simple_formats",
        }
    }

    /// Current value as it would be written to the file.
    pub fn get(&self, settings: &Settings) -> String {
        match self {
            ConfigKey::EncodingFormat => settings.format.to_string(),
            ConfigKey::EncodingMaxFileSize => settings.max_file_size.to_string(),
            ConfigKey::EncodingAlphaThreshold => settings.alpha_threshold.value().to_string(),
            ConfigKey::EncodingHelperThreads => settings.helper_threads.to_string(),
            ConfigKey::EncodingSampleMode => settings.sample_mode.to_string(),
            ConfigKey::EncodingAutocrop => settings.autocrop.to_string(),
            ConfigKey::DisplaySimpleFormats => settings.simple_formats.to_string(),
        }
    }

    /// Parses and stores `value`. Numbers outside their range are clamped
    /// with a warning; anything unparseable is an error and leaves
    /// `settings` unchanged.
    pub fn set(&self, settings: &mut Settings, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::EncodingFormat => {
                settings.format = self.parse(value)?;
            }
            ConfigKey::EncodingMaxFileSize => {
                let bytes: u64 = self.parse(value)?;
                if bytes == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                settings.max_file_size = bytes;
            }
            ConfigKey::EncodingAlphaThreshold => {
                let raw: i32 = self.parse(value)?;
                let threshold = AlphaThreshold::new(raw);
                if threshold.value() != raw {
                    self.warn_clamped(value, threshold.value());
                }
                settings.alpha_threshold = threshold;
            }
            ConfigKey::EncodingHelperThreads => {
                let raw: usize = self.parse(value)?;
                if raw > MAX_HELPER_THREADS {
                    self.warn_clamped(value, MAX_HELPER_THREADS);
                }
                settings.helper_threads = raw.min(MAX_HELPER_THREADS);
            }
            ConfigKey::EncodingSampleMode => {
                settings.sample_mode = self.parse(value)?;
            }
            ConfigKey::EncodingAutocrop => {
                settings.autocrop = self.parse(value)?;
            }
            ConfigKey::DisplaySimpleFormats => {
                settings.simple_formats = self.parse(&value.to_ascii_lowercase())?;
            }
        }
        Ok(())
    }

    /// Like [`set`](Self::set), but a bad value is logged and skipped.
    pub(super) fn apply_lenient(&self, settings: &mut Settings, value: &str) {
        if let Err(err) = self.set(settings, value) {
            reject(*self, value, err);
        }
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value
            .parse()
            .map_err(|err: T::Err| self.invalid(value, err.to_string()))
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn warn_clamped(&self, value: &str, clamped: impl std::fmt::Display) {
        warn!(key = self.name(), value, %clamped, "Configuration value out of range, clamped");
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use crate::job::TextureSampleMode;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("encoding.format".parse::<ConfigKey>().unwrap(), ConfigKey::EncodingFormat);
        assert_eq!(
            "Display.Simple_Formats".parse::<ConfigKey>().unwrap(),
            ConfigKey::DisplaySimpleFormats
        );
        assert!(matches!(
            "encoding.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_names_match_sections() {
        for key in ConfigKey::all() {
            assert_eq!(key.name(), format!("{}.{}", key.section(), key.key_name()));
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = Settings::default();
        ConfigKey::EncodingFormat.set(&mut settings, "dxt3").unwrap();
        ConfigKey::EncodingSampleMode.set(&mut settings, "trilinear").unwrap();
        ConfigKey::DisplaySimpleFormats.set(&mut settings, "FALSE").unwrap();
        assert_eq!(settings.format, PixelFormat::Dxt3);
        assert_eq!(settings.sample_mode, TextureSampleMode::Trilinear);
        assert_eq!(ConfigKey::DisplaySimpleFormats.get(&settings), "false");
    }

    #[test]
    fn test_set_clamps_numbers() {
        let mut settings = Settings::default();
        ConfigKey::EncodingAlphaThreshold.set(&mut settings, "-20").unwrap();
        assert_eq!(settings.alpha_threshold, AlphaThreshold::DISABLED);
        ConfigKey::EncodingHelperThreads.set(&mut settings, "100").unwrap();
        assert_eq!(settings.helper_threads, MAX_HELPER_THREADS);
    }

    #[test]
    fn test_set_rejects_garbage() {
        let mut settings = Settings::default();
        let err = ConfigKey::EncodingMaxFileSize
            .set(&mut settings, "0")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value '0' for encoding.max_file_size: must be greater than zero"
        );
        assert!(ConfigKey::EncodingHelperThreads.set(&mut settings, "-1").is_err());
        assert_eq!(settings, Settings::default());
    }
}
