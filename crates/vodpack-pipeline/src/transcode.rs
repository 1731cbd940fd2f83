//! HLS packaging of a staged video via the external transcoding tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TranscodeError;
use crate::staging::StagedVideo;
use crate::tool::{ToolInvocation, ToolRunner};

/// Extension of the HLS playlist written next to the raw upload.
pub const MANIFEST_EXT: &str = "m3u8";
/// Extension of the HLS media segments.
pub const SEGMENT_EXT: &str = "ts";

/// Drives one external-tool run per staged video, producing an unbounded HLS
/// manifest (`<base_name>.m3u8`) plus fixed-duration segments
/// (`<base_name>_NNN.ts`) inside the staging directory.
pub struct HlsTranscoder {
    ffmpeg_path: String,
    segment_duration: u64,
    timeout: Option<Duration>,
    runner: Arc<dyn ToolRunner>,
}

impl HlsTranscoder {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        segment_duration: u64,
        timeout: Option<Duration>,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            segment_duration,
            timeout,
            runner,
        }
    }

    /// Path the manifest must appear at for the run to count as successful.
    pub fn manifest_path(&self, staged: &StagedVideo) -> PathBuf {
        staged
            .dir
            .join(format!("{}.{}", staged.base_name, MANIFEST_EXT))
    }

    fn build_args(&self, staged: &StagedVideo, manifest_path: &Path) -> Vec<String> {
        let segment_pattern = staged
            .dir
            .join(format!("{}_%03d.{}", staged.base_name, SEGMENT_EXT));

        vec![
            "-i".to_string(),
            staged.raw_path.to_string_lossy().to_string(),
            "-f".to_string(),
            "hls".to_string(),
            "-hls_time".to_string(),
            self.segment_duration.to_string(),
            // 0 keeps every segment in the playlist (VOD, not a sliding live window).
            "-hls_list_size".to_string(),
            "0".to_string(),
            "-hls_segment_filename".to_string(),
            segment_pattern.to_string_lossy().to_string(),
            manifest_path.to_string_lossy().to_string(),
        ]
    }

    /// Transcode a staged video and return the manifest path.
    ///
    /// Checks `cancel` before spawning anything, so a run cancelled early
    /// never launches the process at all. A deadline or cancellation after
    /// spawn terminates the process via the runner.
    pub async fn transcode(
        &self,
        staged: &StagedVideo,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, TranscodeError> {
        if cancel.is_cancelled() {
            return Err(TranscodeError::Cancelled);
        }

        let manifest_path = self.manifest_path(staged);
        let invocation = ToolInvocation {
            program: self.ffmpeg_path.clone(),
            args: self.build_args(staged, &manifest_path),
        };

        tracing::debug!(
            program = %invocation.program,
            args = ?invocation.args,
            "Invoking transcode tool"
        );

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.runner.run(invocation, cancel))
                .await
                .map_err(|_| TranscodeError::TimedOut {
                    timeout_secs: timeout.as_secs(),
                })??,
            None => self.runner.run(invocation, cancel).await?,
        };

        if !output.success {
            return Err(TranscodeError::Failed {
                status: output.status_label(),
                stderr: output.stderr,
            });
        }

        // The tool's exit code alone is not trusted; the manifest on disk is
        // the success signal for this stage.
        if !manifest_path.is_file() {
            return Err(TranscodeError::MissingManifest {
                path: manifest_path,
            });
        }

        tracing::info!(
            base_name = %staged.base_name,
            manifest = %manifest_path.display(),
            "Transcode complete"
        );

        Ok(manifest_path)
    }
}
