//! Sequencing of one ingestion run: stage, transcode, enumerate, publish.

use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vodpack_core::models::{IngestionReport, IngestionRequest, IngestionState};

use crate::enumerate::enumerate_artifacts;
use crate::error::PipelineError;
use crate::publish::ArtifactPublisher;
use crate::staging::StagingArea;
use crate::transcode::{HlsTranscoder, MANIFEST_EXT};

/// Runs uploads through the four pipeline stages, strictly in order.
///
/// A fatal stage error aborts the run with the failing stage attached to the
/// [`PipelineError`]. Per-artifact upload failures are not fatal: they are
/// recorded in the report and the run still finishes as `Done`.
///
/// Concurrency exists only across runs; the pipeline itself holds no mutable
/// state, so one instance serves any number of concurrent uploads.
pub struct IngestionPipeline {
    staging: StagingArea,
    transcoder: HlsTranscoder,
    publisher: ArtifactPublisher,
}

impl IngestionPipeline {
    pub fn new(
        staging: StagingArea,
        transcoder: HlsTranscoder,
        publisher: ArtifactPublisher,
    ) -> Self {
        Self {
            staging,
            transcoder,
            publisher,
        }
    }

    /// Run one upload to a terminal state and report per-artifact outcomes.
    ///
    /// `cancel` is checked before the external process is spawned and while
    /// it runs; a fired token terminates the process and fails the run with
    /// the transcode stage attached.
    #[tracing::instrument(skip(self, request, cancel), fields(file_name = %request.file_name))]
    pub async fn ingest(
        &self,
        request: IngestionRequest,
        cancel: &CancellationToken,
    ) -> Result<IngestionReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        tracing::info!(
            run_id = %run_id,
            file_name = %request.file_name,
            size_bytes = request.bytes.len(),
            state = %IngestionState::Received,
            "Ingestion run accepted"
        );

        let staged = self.staging.stage(&request).await?;
        tracing::info!(
            run_id = %run_id,
            base_name = %staged.base_name,
            dir = %staged.dir.display(),
            state = %IngestionState::Staged,
            "Upload staged for transcoding"
        );

        self.transcoder.transcode(&staged, cancel).await?;
        tracing::info!(
            run_id = %run_id,
            base_name = %staged.base_name,
            state = %IngestionState::Transcoded,
            "Streaming artifacts generated"
        );

        let artifacts = enumerate_artifacts(&staged.dir, staged.source_ext.as_deref())
            .await
            .map_err(PipelineError::Enumerate)?;
        tracing::info!(
            run_id = %run_id,
            base_name = %staged.base_name,
            artifact_count = artifacts.len(),
            state = %IngestionState::Enumerated,
            "Staging directory enumerated"
        );

        let artifacts = self.publisher.publish(&artifacts).await;
        let failed_count = artifacts.iter().filter(|o| o.is_failed()).count();
        if failed_count > 0 {
            tracing::warn!(
                run_id = %run_id,
                base_name = %staged.base_name,
                failed_count,
                state = %IngestionState::Published,
                "Publishing finished with per-artifact failures"
            );
        }

        let report = IngestionReport {
            run_id,
            base_name: staged.base_name.clone(),
            state: IngestionState::Done,
            manifest: format!("{}.{}", staged.base_name, MANIFEST_EXT),
            artifacts,
            completed_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            run_id = %run_id,
            base_name = %report.base_name,
            uploaded = report.uploaded_count(),
            failed = report.failed_count(),
            excluded = report.excluded_count(),
            duration_ms = report.duration_ms,
            state = %report.state,
            "Ingestion run finished"
        );

        Ok(report)
    }
}
