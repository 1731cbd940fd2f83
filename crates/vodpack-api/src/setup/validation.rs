//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use vodpack_core::{Config, StorageBackend};

/// Validate critical configuration values
///
/// This function checks that critical configuration is set correctly and will
/// fail fast if there are issues that could cause security problems or runtime errors.
pub fn validate_config(config: &Config) -> Result<()> {
    // Core invariants (segment duration, size limits, extension list, key prefix)
    config.validate()?;

    // Validate production mode detection
    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    // Validate CORS configuration in production
    if is_production {
        let cors_origins = config.cors_origins();
        if cors_origins.contains(&"*".to_string()) {
            return Err(anyhow::anyhow!(
                "CORS configured to allow all origins (*) in production - this is a security risk. \
                Please set specific allowed origins via CORS_ORIGINS environment variable."
            ));
        }
    }

    if config.ffmpeg_path().trim().is_empty() {
        return Err(anyhow::anyhow!(
            "Transcode tool path cannot be empty - set FFMPEG_PATH environment variable"
        ));
    }

    if config.storage_backend() == StorageBackend::S3 && config.s3_config().is_none() {
        return Err(anyhow::anyhow!(
            "S3 storage backend selected but S3_BUCKET, S3_REGION, S3_ACCESS_KEY_ID and \
            S3_SECRET_ACCESS_KEY are not all set"
        ));
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
