//! Tracing subscriber setup.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `spraykit=info`). With
//! `--log-file` a second copy at debug level goes to that file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::CliError;

const DEFAULT_FILTER: &str = "spraykit=info";
const FILE_FILTER: &str = "spraykit=debug";

/// Keeps the file writer flushing until dropped.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber. `verbose` raises the stderr default to
/// debug when `RUST_LOG` is unset.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<LoggingGuard, CliError> {
    let default = if verbose { "spraykit=debug" } else { DEFAULT_FILTER };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir).map_err(|e| CliError::Logging {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging {
            path: log_file.map(Path::to_path_buf).unwrap_or_default(),
            reason: e.to_string(),
        })?;

    Ok(LoggingGuard { _file: guard })
}

/// Splits a log path into its directory (current directory when bare) and
/// file name.
fn split_log_path(path: &Path) -> Result<(std::path::PathBuf, std::ffi::OsString), CliError> {
    let name = path.file_name().ok_or_else(|| CliError::Logging {
        path: path.to_path_buf(),
        reason: "not a file path".to_string(),
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    Ok((dir, name.to_os_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("logs/run.log")).unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "run.log");

        let (dir, _) = split_log_path(Path::new("run.log")).unwrap();
        assert_eq!(dir, Path::new("."));

        assert!(split_log_path(Path::new("/")).is_err());
    }
}
