use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// State machine of one ingestion run. Linear progression; `Failed` is the
/// only terminal state besides `Done` and is reachable from any non-terminal
/// state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IngestionState {
    Received,
    Staged,
    Transcoded,
    Enumerated,
    Published,
    Done,
    Failed,
}

impl Display for IngestionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IngestionState::Received => write!(f, "received"),
            IngestionState::Staged => write!(f, "staged"),
            IngestionState::Transcoded => write!(f, "transcoded"),
            IngestionState::Enumerated => write!(f, "enumerated"),
            IngestionState::Published => write!(f, "published"),
            IngestionState::Done => write!(f, "done"),
            IngestionState::Failed => write!(f, "failed"),
        }
    }
}

/// The pipeline stage a fatal error is attributed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Staging,
    Transcode,
    Enumerate,
    Publish,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineStage::Staging => write!(f, "staging"),
            PipelineStage::Transcode => write!(f, "transcode"),
            PipelineStage::Enumerate => write!(f, "enumerate"),
            PipelineStage::Publish => write!(f, "publish"),
        }
    }
}

/// A raw upload handed to the pipeline by the boundary layer. Immutable;
/// consumed by staging.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub bytes: Bytes,
    pub file_name: String,
}

impl IngestionRequest {
    pub fn new(file_name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }
}

/// How one staging-directory entry fared during publishing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactDisposition {
    /// Uploaded to the remote store.
    Uploaded,
    /// Upload was attempted and failed; the batch continued.
    Failed,
    /// Carries the original upload's container extension; never published.
    Excluded,
}

/// Per-artifact outcome inside an [`IngestionReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactOutcome {
    pub file_name: String,
    pub disposition: ArtifactDisposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactOutcome {
    pub fn uploaded(file_name: impl Into<String>, key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            disposition: ArtifactDisposition::Uploaded,
            key: Some(key.into()),
            size_bytes: Some(size_bytes),
            error: None,
        }
    }

    pub fn failed(
        file_name: impl Into<String>,
        key: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            disposition: ArtifactDisposition::Failed,
            key: Some(key.into()),
            size_bytes: None,
            error: Some(error.into()),
        }
    }

    pub fn excluded(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            disposition: ArtifactDisposition::Excluded,
            key: None,
            size_bytes: None,
            error: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.disposition == ArtifactDisposition::Failed
    }
}

/// Terminal result of an ingestion run. A report with failed outcomes is a
/// legitimate `Done` value; callers decide severity from the per-artifact
/// detail instead of a swallowed boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReport {
    pub run_id: Uuid,
    pub base_name: String,
    pub state: IngestionState,
    pub manifest: String,
    pub artifacts: Vec<ArtifactOutcome>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl IngestionReport {
    pub fn uploaded_count(&self) -> usize {
        self.count(ArtifactDisposition::Uploaded)
    }

    pub fn failed_count(&self) -> usize {
        self.count(ArtifactDisposition::Failed)
    }

    pub fn excluded_count(&self) -> usize {
        self.count(ArtifactDisposition::Excluded)
    }

    /// True when every uploadable artifact reached the remote store.
    pub fn is_fully_published(&self) -> bool {
        self.failed_count() == 0
    }

    fn count(&self, disposition: ArtifactDisposition) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.disposition == disposition)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(artifacts: Vec<ArtifactOutcome>) -> IngestionReport {
        IngestionReport {
            run_id: Uuid::new_v4(),
            base_name: "clip".to_string(),
            state: IngestionState::Done,
            manifest: "clip.m3u8".to_string(),
            artifacts,
            completed_at: Utc::now(),
            duration_ms: 1200,
        }
    }

    #[test]
    fn test_report_counts_by_disposition() {
        let report = report_with(vec![
            ArtifactOutcome::uploaded("clip.m3u8", "media/clip.m3u8", 312),
            ArtifactOutcome::uploaded("clip_000.ts", "media/clip_000.ts", 1_048_576),
            ArtifactOutcome::failed("clip_001.ts", "media/clip_001.ts", "connection reset"),
            ArtifactOutcome::excluded("clip.mp4"),
        ]);

        assert_eq!(report.uploaded_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.excluded_count(), 1);
        assert!(!report.is_fully_published());
    }

    #[test]
    fn test_report_fully_published_without_failures() {
        let report = report_with(vec![
            ArtifactOutcome::uploaded("clip.m3u8", "media/clip.m3u8", 312),
            ArtifactOutcome::excluded("clip.mp4"),
        ]);

        assert!(report.is_fully_published());
    }

    #[test]
    fn test_state_display_matches_wire_format() {
        assert_eq!(IngestionState::Done.to_string(), "done");
        assert_eq!(IngestionState::Failed.to_string(), "failed");
        assert_eq!(PipelineStage::Transcode.to_string(), "transcode");
    }
}
