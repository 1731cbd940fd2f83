use std::path::PathBuf;

use vodpack_core::models::PipelineStage;

/// Errors raised while staging an upload.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Staging directory already exists: {}", path.display())]
    Conflict { path: PathBuf },

    #[error("Invalid file name for staging: {name}")]
    InvalidFileName { name: String },

    #[error("Staging I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while running the external transcoding tool.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Failed to run transcode tool '{program}': {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transcode tool failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Transcode produced no manifest at {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("Transcode cancelled")]
    Cancelled,

    #[error("Transcode exceeded the {timeout_secs}s deadline")]
    TimedOut { timeout_secs: u64 },
}

/// A fatal pipeline error: the run stopped before reaching `Done`.
///
/// Per-artifact upload failures are deliberately absent here; they are
/// recorded in the report instead of aborting the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("Failed to enumerate staging directory: {0}")]
    Enumerate(#[source] std::io::Error),
}

impl PipelineError {
    /// The stage the run failed in.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Staging(_) => PipelineStage::Staging,
            PipelineError::Transcode(_) => PipelineStage::Transcode,
            PipelineError::Enumerate(_) => PipelineStage::Enumerate,
        }
    }

    /// Whether the run was stopped by cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Transcode(TranscodeError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_carries_failing_stage() {
        let err = PipelineError::from(StagingError::Conflict {
            path: PathBuf::from("/tmp/staging/clip"),
        });
        assert_eq!(err.stage(), PipelineStage::Staging);

        let err = PipelineError::from(TranscodeError::Failed {
            status: "exit code 1".to_string(),
            stderr: "invalid data".to_string(),
        });
        assert_eq!(err.stage(), PipelineStage::Transcode);

        let err = PipelineError::Enumerate(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.stage(), PipelineStage::Enumerate);
    }

    #[test]
    fn test_cancellation_is_not_a_fault() {
        let err = PipelineError::from(TranscodeError::Cancelled);
        assert!(err.is_cancelled());

        let err = PipelineError::from(TranscodeError::TimedOut { timeout_secs: 30 });
        assert!(!err.is_cancelled());
    }
}
