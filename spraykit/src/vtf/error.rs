//! Errors surfaced by the container writer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;
use crate::compress::CompressError;
use crate::job::JobError;
use crate::source::LoadError;

/// Why an encode or write failed.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// An internal table is inconsistent; never caused by user input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The job or its sources cannot be encoded.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Bytes written differ from the precomputed file size.
    #[error("Encoded {actual} bytes, expected {expected}")]
    Consistency { expected: u64, actual: u64 },

    /// The block compressor reported a failure.
    #[error("Block compressor failed: {0}")]
    ExternalCodec(String),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EncodeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> EncodeError {
        let path = path.into();
        move |source| EncodeError::Io { path, source }
    }
}

impl From<JobError> for EncodeError {
    fn from(err: JobError) -> Self {
        if err.is_configuration() {
            EncodeError::Configuration(err.to_string())
        } else {
            EncodeError::Input(err.to_string())
        }
    }
}

impl From<CodecError> for EncodeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidSourceLayout(_) => EncodeError::Configuration(err.to_string()),
            CodecError::UnsupportedFormat(_) | CodecError::SourceTooShort { .. } => {
                EncodeError::Input(err.to_string())
            }
        }
    }
}

impl From<CompressError> for EncodeError {
    fn from(err: CompressError) -> Self {
        EncodeError::ExternalCodec(err.to_string())
    }
}

impl From<LoadError> for EncodeError {
    fn from(err: LoadError) -> Self {
        EncodeError::Input(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    #[test]
    fn test_job_errors_map_to_kind() {
        let err = EncodeError::from(JobError::InvalidLayout(PixelFormat::P8));
        assert!(matches!(err, EncodeError::Configuration(_)));

        let err = EncodeError::from(JobError::MissingSource {
            mipmap: 1,
            frame: 2,
        });
        assert_eq!(
            err.to_string(),
            "Invalid input: No source image for mipmap 1, frame 2"
        );
    }

    #[test]
    fn test_codec_errors_map_to_kind() {
        let err = EncodeError::from(CodecError::InvalidSourceLayout(PixelFormat::P8));
        assert!(matches!(err, EncodeError::Configuration(_)));
        let err = EncodeError::from(CodecError::UnsupportedFormat(PixelFormat::R32F));
        assert!(matches!(err, EncodeError::Input(_)));
    }

    #[test]
    fn test_consistency_display() {
        let err = EncodeError::Consistency {
            expected: 100,
            actual: 96,
        };
        assert_eq!(err.to_string(), "Encoded 96 bytes, expected 100");
    }

    #[test]
    fn test_compress_error_is_external() {
        let err = EncodeError::from(CompressError::Failed("boom".into()));
        assert!(matches!(err, EncodeError::ExternalCodec(ref msg) if msg.contains("boom")));
    }
}
