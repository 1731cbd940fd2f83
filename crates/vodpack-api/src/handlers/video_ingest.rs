//! Video upload and ingestion handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use vodpack_core::models::{IngestionReport, IngestionRequest};

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// POST /api/v0/videos
///
/// Accepts exactly one multipart field named `file`, runs the full ingestion
/// pipeline and returns the per-artifact report. A run that finishes with
/// some uploads failed is still a 200; the failures are in the report body.
pub async fn ingest_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<IngestionReport>, HttpAppError> {
    let (data, file_name) = extract_multipart_file(multipart).await?;

    state.validator.validate_all(&file_name, data.len())?;

    tracing::info!(
        file_name = %file_name,
        size_bytes = data.len(),
        "Video upload received"
    );

    // Every run is a child of the server shutdown token so in-flight
    // transcodes terminate when the process is asked to stop.
    let cancel = state.shutdown.child_token();
    let report = state
        .pipeline
        .ingest(IngestionRequest::new(file_name, data), &cancel)
        .await?;

    Ok(Json(report))
}
