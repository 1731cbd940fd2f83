//! Upload validation ahead of any filesystem side effect.

use std::path::Path;

/// Validation failures for an incoming upload.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Validates uploads before the pipeline touches the filesystem.
///
/// Checks size bounds, the container extension against an allow-list and
/// basic filename hygiene. Deeper content sniffing is left to the transcoding
/// tool, which rejects what it cannot read.
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the container extension against the allow-list
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate that the filename is a plain path component
    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.is_empty() {
            return Err(ValidationError::InvalidFilename(
                "filename is empty".to_string(),
            ));
        }

        if filename.len() > 255 {
            return Err(ValidationError::InvalidFilename(
                "filename exceeds 255 bytes".to_string(),
            ));
        }

        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }

        if filename.chars().any(char::is_control) {
            return Err(ValidationError::InvalidFilename(
                "filename contains control characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate all aspects of an upload
    pub fn validate_all(&self, filename: &str, file_size: usize) -> Result<(), ValidationError> {
        self.validate_filename(filename)?;
        self.validate_extension(filename)?;
        self.validate_file_size(file_size)?;
        Ok(())
    }
}
