//! Publishing enumerated artifacts to the remote store.

use std::sync::Arc;

use vodpack_core::models::ArtifactOutcome;
use vodpack_storage::{artifact_key, Storage};

use crate::enumerate::Artifact;

/// Uploads artifacts one at a time, in enumeration order.
///
/// A failed upload is recorded in that artifact's outcome and the batch moves
/// on; publishing never aborts the run.
pub struct ArtifactPublisher {
    storage: Arc<dyn Storage>,
    key_prefix: String,
}

impl ArtifactPublisher {
    pub fn new(storage: Arc<dyn Storage>, key_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
        }
    }

    /// Attempt every uploadable artifact exactly once and report one outcome
    /// per enumerated artifact, excluded entries included.
    pub async fn publish(&self, artifacts: &[Artifact]) -> Vec<ArtifactOutcome> {
        let mut outcomes = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            if !artifact.is_uploadable() {
                tracing::debug!(
                    file_name = %artifact.file_name,
                    "Source container excluded from publishing"
                );
                outcomes.push(ArtifactOutcome::excluded(&artifact.file_name));
                continue;
            }

            outcomes.push(self.publish_one(artifact).await);
        }

        outcomes
    }

    async fn publish_one(&self, artifact: &Artifact) -> ArtifactOutcome {
        let key = artifact_key(&self.key_prefix, &artifact.file_name);

        let data = match tokio::fs::read(&artifact.path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    file_name = %artifact.file_name,
                    key = %key,
                    error = %e,
                    "Failed to read artifact from staging; continuing with remaining artifacts"
                );
                return ArtifactOutcome::failed(&artifact.file_name, key, e.to_string());
            }
        };

        let size_bytes = data.len() as u64;
        match self
            .storage
            .upload(&key, data, artifact.content_type())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    file_name = %artifact.file_name,
                    key = %key,
                    size_bytes,
                    "Artifact published"
                );
                ArtifactOutcome::uploaded(&artifact.file_name, key, size_bytes)
            }
            Err(e) => {
                tracing::warn!(
                    file_name = %artifact.file_name,
                    key = %key,
                    error = %e,
                    "Artifact upload failed; continuing with remaining artifacts"
                );
                ArtifactOutcome::failed(&artifact.file_name, key, e.to_string())
            }
        }
    }
}
