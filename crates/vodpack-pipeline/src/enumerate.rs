//! Post-transcode enumeration of the staging directory.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::transcode::{MANIFEST_EXT, SEGMENT_EXT};

/// Classification of one staging-directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Streaming artifact (manifest, segment or anything else the tool
    /// produced): published to the remote store.
    Uploadable,
    /// Carries the original upload's container extension; never published.
    Excluded,
}

/// One file found in the staging directory after transcoding.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn is_uploadable(&self) -> bool {
        self.kind == ArtifactKind::Uploadable
    }

    /// Content type advertised on upload, derived from the extension.
    pub fn content_type(&self) -> &'static str {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(MANIFEST_EXT) => "application/vnd.apple.mpegurl",
            Some(ext) if ext.eq_ignore_ascii_case(SEGMENT_EXT) => "video/mp2t",
            _ => "application/octet-stream",
        }
    }
}

/// List every regular file in `dir` and classify it against the source
/// container extension (case-insensitive). Subdirectories are skipped.
///
/// Entries come back sorted by file name, so enumerating the same completed
/// directory twice yields the same sequence. An empty directory is an empty
/// result, not an error.
pub async fn enumerate_artifacts(
    dir: &Path,
    source_ext: Option<&str>,
) -> std::io::Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };

        let kind = match (path.extension().and_then(|e| e.to_str()), source_ext) {
            (Some(ext), Some(source)) if ext.eq_ignore_ascii_case(source) => ArtifactKind::Excluded,
            _ => ArtifactKind::Uploadable,
        };

        artifacts.push(Artifact {
            file_name,
            path,
            kind,
        });
    }

    artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_source_container_is_excluded_everything_else_uploads() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "clip.mp4").await;
        touch(tmp.path(), "clip.m3u8").await;
        touch(tmp.path(), "clip_000.ts").await;
        touch(tmp.path(), "clip_001.ts").await;

        let artifacts = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();
        assert_eq!(artifacts.len(), 4);

        let excluded: Vec<_> = artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::Excluded)
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(excluded, vec!["clip.mp4"]);

        let uploadable: Vec<_> = artifacts
            .iter()
            .filter(|a| a.is_uploadable())
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(uploadable, vec!["clip.m3u8", "clip_000.ts", "clip_001.ts"]);
    }

    #[tokio::test]
    async fn test_exclusion_matches_extension_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "clip.MP4").await;
        touch(tmp.path(), "clip.m3u8").await;

        let artifacts = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();
        let excluded: Vec<_> = artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::Excluded)
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(excluded, vec!["clip.MP4"]);
    }

    #[tokio::test]
    async fn test_no_source_extension_uploads_everything() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "rawdump").await;
        touch(tmp.path(), "rawdump.m3u8").await;

        let artifacts = enumerate_artifacts(tmp.path(), None).await.unwrap();
        assert!(artifacts.iter().all(|a| a.is_uploadable()));
    }

    #[tokio::test]
    async fn test_results_are_sorted_and_stable_across_calls() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "clip_001.ts").await;
        touch(tmp.path(), "clip.m3u8").await;
        touch(tmp.path(), "clip_000.ts").await;

        let first = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();
        let second = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();

        let names: Vec<_> = first.iter().map(|a| a.file_name.clone()).collect();
        assert_eq!(names, vec!["clip.m3u8", "clip_000.ts", "clip_001.ts"]);
        assert_eq!(
            names,
            second.iter().map(|a| a.file_name.clone()).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_empty_directory_is_empty_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();
        assert!(artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_subdirectories_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "clip.m3u8").await;
        fs::create_dir(tmp.path().join("scratch")).await.unwrap();

        let artifacts = enumerate_artifacts(tmp.path(), Some("mp4")).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name, "clip.m3u8");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("gone");
        assert!(enumerate_artifacts(&missing, Some("mp4")).await.is_err());
    }

    #[test]
    fn test_content_types_for_streaming_artifacts() {
        let manifest = Artifact {
            file_name: "clip.m3u8".to_string(),
            path: PathBuf::from("/s/clip/clip.m3u8"),
            kind: ArtifactKind::Uploadable,
        };
        assert_eq!(manifest.content_type(), "application/vnd.apple.mpegurl");

        let segment = Artifact {
            file_name: "clip_000.ts".to_string(),
            path: PathBuf::from("/s/clip/clip_000.ts"),
            kind: ArtifactKind::Uploadable,
        };
        assert_eq!(segment.content_type(), "video/mp2t");

        let other = Artifact {
            file_name: "clip.vtt".to_string(),
            path: PathBuf::from("/s/clip/clip.vtt"),
            kind: ArtifactKind::Uploadable,
        };
        assert_eq!(other.content_type(), "application/octet-stream");
    }
}
