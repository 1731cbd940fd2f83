//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use vodpack_core::Config;
use vodpack_pipeline::{
    ArtifactPublisher, HlsTranscoder, IngestionPipeline, StagingArea, SystemToolRunner, ToolRunner,
    UploadValidator,
};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(config).context("Configuration validation failed")?;

    // Initialize telemetry first
    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    // Setup storage
    let storage = storage::setup_storage(config).await?;

    // Assemble the ingestion pipeline around the real tool runner
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemToolRunner);
    let pipeline = IngestionPipeline::new(
        StagingArea::new(config.staging_root()),
        HlsTranscoder::new(
            config.ffmpeg_path(),
            config.hls_segment_duration(),
            config.transcode_timeout(),
            runner,
        ),
        ArtifactPublisher::new(storage.clone(), config.media_key_prefix()),
    );

    let validator = UploadValidator::new(
        config.max_video_size_bytes(),
        config.video_allowed_extensions().to_vec(),
    );

    let state = Arc::new(AppState {
        pipeline,
        storage,
        validator,
        shutdown: CancellationToken::new(),
    });

    // Setup routes
    let router = routes::setup_routes(config, state.clone())?;

    Ok((state, router))
}
