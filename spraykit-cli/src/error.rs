//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use spraykit::config::ConfigError;
use spraykit::job::JobError;
use spraykit::source::LoadError;
use spraykit::vtf::EncodeError;

/// Errors reported to the user before exiting with status 1.
#[derive(Debug)]
pub enum CliError {
    /// Reading or changing settings failed.
    Config(String),
    /// An input file could not be loaded.
    Load(LoadError),
    /// The job parameters are unusable.
    Job(JobError),
    /// Encoding or writing the texture failed.
    Encode(EncodeError),
    /// A command-line value could not be used.
    InvalidArgument(String),
    /// Logging could not be set up.
    Logging { path: PathBuf, reason: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Load(err) => write!(f, "{}", err),
            CliError::Job(err) => write!(f, "{}", err),
            CliError::Encode(err) => write!(f, "{}", err),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Logging { path, reason } => {
                write!(f, "Cannot log to {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Load(err) => Some(err),
            CliError::Job(err) => Some(err),
            CliError::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        CliError::Load(err)
    }
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        CliError::Job(err)
    }
}

impl From<EncodeError> for CliError {
    fn from(err: EncodeError) -> Self {
        CliError::Encode(err)
    }
}
