//! Configuration module
//!
//! Environment-driven configuration for the packaging service. All ambient
//! state is read here, once, at startup; everything below this layer receives
//! plain values. In particular the remote-store settings are handed to the
//! storage backend as an explicit [`S3Config`] value rather than being read
//! from the process environment at use sites.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage_types::StorageBackend;

/// Remote object store settings, assembled at the configuration boundary and
/// injected into the S3 backend at construction.
#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    cors_origins: Vec<String>,
    environment: String,
    staging_root: PathBuf,
    ffmpeg_path: String,
    hls_segment_duration: u64,
    transcode_timeout_secs: Option<u64>,
    max_video_size_bytes: usize,
    video_allowed_extensions: Vec<String>,
    storage_backend: StorageBackend,
    media_key_prefix: String,
    local_storage_path: String,
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    s3_access_key_id: Option<String>,
    s3_secret_access_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const SERVER_PORT: u16 = 4000;
        const MAX_VIDEO_SIZE_MB: usize = 500;
        const HLS_SEGMENT_DURATION: u64 = 10;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(StorageBackend::Local);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            staging_root: env::var("STAGING_ROOT")
                .unwrap_or_else(|_| "./data/staging".to_string())
                .into(),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            hls_segment_duration: env::var("HLS_SEGMENT_DURATION")
                .unwrap_or_else(|_| HLS_SEGMENT_DURATION.to_string())
                .parse()
                .unwrap_or(HLS_SEGMENT_DURATION),
            transcode_timeout_secs: env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_MB")
                .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_VIDEO_SIZE_MB)
                * 1024
                * 1024,
            video_allowed_extensions: env::var("ALLOWED_VIDEO_EXTENSIONS")
                .unwrap_or_else(|_| "mp4,mov,avi,mkv,webm".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect(),
            storage_backend,
            media_key_prefix: env::var("MEDIA_KEY_PREFIX").unwrap_or_else(|_| "media".to_string()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/media".to_string()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_access_key_id: env::var("S3_ACCESS_KEY_ID")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .ok(),
            s3_secret_access_key: env::var("S3_SECRET_ACCESS_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .ok(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.hls_segment_duration == 0 {
            return Err(anyhow::anyhow!(
                "HLS_SEGMENT_DURATION must be greater than zero"
            ));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.video_allowed_extensions.iter().all(|e| e.is_empty()) {
            return Err(anyhow::anyhow!(
                "ALLOWED_VIDEO_EXTENSIONS must list at least one extension"
            ));
        }

        let prefix = self.media_key_prefix.trim_matches('/');
        if prefix.is_empty() {
            return Err(anyhow::anyhow!("MEDIA_KEY_PREFIX must not be empty"));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using the S3 storage backend"
                ));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using the S3 storage backend"
                ));
            }
            if self.s3_access_key_id.is_none() || self.s3_secret_access_key.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set when using the S3 storage backend"
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase().eq("production")
            || self.environment.to_lowercase().eq("prod")
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn hls_segment_duration(&self) -> u64 {
        self.hls_segment_duration
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.video_allowed_extensions
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn media_key_prefix(&self) -> &str {
        self.media_key_prefix.trim_matches('/')
    }

    pub fn local_storage_path(&self) -> &str {
        &self.local_storage_path
    }

    /// Assemble the injected remote-store settings. `None` unless every
    /// required S3 field is configured.
    pub fn s3_config(&self) -> Option<S3Config> {
        Some(S3Config {
            bucket: self.s3_bucket.clone()?,
            region: self.s3_region.clone()?,
            endpoint: self.s3_endpoint.clone(),
            access_key_id: self.s3_access_key_id.clone()?,
            secret_access_key: self.s3_secret_access_key.clone()?,
        })
    }
}
