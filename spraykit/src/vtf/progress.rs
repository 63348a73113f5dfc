//! Stage and progress reporting for the container writer.

use std::fmt;

/// Where the writer is in an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    /// Validating the job and computing the file size.
    Sizing,
    /// Reserving the output buffer.
    Allocating,
    /// Encoding one image.
    Encoding { mipmap: u32, frame: u32 },
    /// Checking the written size.
    Finalizing,
    /// Output complete.
    Written,
    /// The encode stopped with an error.
    Failed,
}

impl EncodeStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sizing => "Sizing",
            Self::Allocating => "Allocating",
            Self::Encoding { .. } => "Encoding",
            Self::Finalizing => "Finalizing",
            Self::Written => "Written",
            Self::Failed => "Failed",
        }
    }

    /// Whether no further stages follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Written | Self::Failed)
    }
}

impl fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding { mipmap, frame } => {
                write!(f, "Encoding mipmap {} frame {}", mipmap, frame)
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Receives progress from an encode. All methods default to doing nothing.
///
/// Calls arrive on the thread that called the writer.
pub trait EncodeProgress {
    /// The writer entered `stage`.
    fn on_stage(&mut self, _stage: EncodeStage) {}

    /// `done` of `total` images have been encoded.
    fn on_image(&mut self, _done: u32, _total: u32) {}

    /// Block compression of the current image is `percent` complete.
    fn on_codec(&mut self, _percent: u32) {}
}

/// Ignores all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl EncodeProgress for NoProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(EncodeStage::Sizing.to_string(), "Sizing");
        assert_eq!(
            EncodeStage::Encoding {
                mipmap: 2,
                frame: 0
            }
            .to_string(),
            "Encoding mipmap 2 frame 0"
        );
    }

    #[test]
    fn test_terminal_stages() {
        assert!(EncodeStage::Written.is_terminal());
        assert!(EncodeStage::Failed.is_terminal());
        assert!(!EncodeStage::Finalizing.is_terminal());
    }
}
