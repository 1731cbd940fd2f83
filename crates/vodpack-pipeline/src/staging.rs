//! Run-exclusive staging directories for uploaded videos.
//!
//! Each upload gets `<root>/<base_name>/` where `base_name` is the original
//! file name minus its final extension. The raw bytes are written verbatim
//! into that directory and the transcode stage later writes the manifest and
//! segments next to them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use vodpack_core::models::IngestionRequest;

use crate::error::StagingError;

/// A successfully staged upload.
#[derive(Debug, Clone)]
pub struct StagedVideo {
    /// Run-exclusive working directory.
    pub dir: PathBuf,
    /// Original file name minus its final extension; names the directory,
    /// the manifest and the segment files.
    pub base_name: String,
    /// The original upload's container extension, lowercased. Staging entries
    /// with this extension are excluded from publishing.
    pub source_ext: Option<String>,
    /// Path of the raw upload inside `dir`.
    pub raw_path: PathBuf,
}

/// Creates staging directories keyed by base name under a fixed root.
///
/// The root itself is created on demand; per-upload directories are exclusive
/// and an existing one is a conflict, never silently reused. Partially staged
/// directories left behind by a failed write are not rolled back.
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stage one upload: create `<root>/<base_name>/` and write the raw bytes
    /// to `<dir>/<file_name>`.
    pub async fn stage(&self, request: &IngestionRequest) -> Result<StagedVideo, StagingError> {
        validate_file_name(&request.file_name)?;

        let base_name = base_name_of(&request.file_name);
        let source_ext = extension_of(&request.file_name);
        let dir = self.root.join(&base_name);

        fs::create_dir_all(&self.root).await?;

        // create_dir rather than create_dir_all: an existing directory must
        // surface as a conflict instead of being reused, and the kernel-level
        // AlreadyExists check makes the test-and-create atomic.
        if let Err(e) = fs::create_dir(&dir).await {
            if e.kind() == ErrorKind::AlreadyExists {
                return Err(StagingError::Conflict { path: dir });
            }
            return Err(StagingError::Io(e));
        }

        let raw_path = dir.join(&request.file_name);
        fs::write(&raw_path, &request.bytes).await?;

        tracing::info!(
            base_name = %base_name,
            dir = %dir.display(),
            size_bytes = request.bytes.len(),
            "Upload staged"
        );

        Ok(StagedVideo {
            dir,
            base_name,
            source_ext,
            raw_path,
        })
    }
}

/// The staged file name becomes a path component, so it must be a plain name.
fn validate_file_name(file_name: &str) -> Result<(), StagingError> {
    let invalid = file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
        || file_name.chars().any(char::is_control);

    if invalid {
        return Err(StagingError::InvalidFileName {
            name: file_name.to_string(),
        });
    }
    Ok(())
}

/// Original file name minus its final extension. A name without an extension
/// is used as-is.
pub fn base_name_of(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name)
        .to_string()
}

/// The final extension of the file name, lowercased. `None` when the name has
/// no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}
