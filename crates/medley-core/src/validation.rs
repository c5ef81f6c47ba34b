//! Upload request validation
//!
//! Grants are the only gate before clients talk to blob storage directly,
//! so the declared filename, content type and size are checked here against
//! the per-kind policy from configuration.

use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error, PartialEq)]
pub enum UploadValidationError {
    #[error("File size {size} exceeds maximum allowed size of {max} bytes")]
    FileTooLarge { size: i64, max: i64 },

    #[error("File extension '{0}' is not allowed")]
    InvalidExtension(String),

    #[error("Content type '{0}' is not allowed")]
    InvalidContentType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File is empty")]
    EmptyFile,
}

impl From<UploadValidationError> for AppError {
    fn from(err: UploadValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Lowercased extension of a filename, `bin` when it has none.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Per-kind upload policy, built from configuration.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_size_bytes: i64,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(
        max_size_bytes: i64,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        UploadPolicy {
            max_size_bytes,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn max_size_bytes(&self) -> i64 {
        self.max_size_bytes
    }

    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        file_size: i64,
    ) -> Result<(), UploadValidationError> {
        let trimmed = filename.trim();
        if trimmed.is_empty()
            || trimmed.contains('/')
            || trimmed.contains('\\')
            || trimmed.contains("..")
            || trimmed.contains('\0')
        {
            return Err(UploadValidationError::InvalidFilename(
                filename.to_string(),
            ));
        }

        if file_size == 0 {
            return Err(UploadValidationError::EmptyFile);
        }
        if file_size > self.max_size_bytes {
            return Err(UploadValidationError::FileTooLarge {
                size: file_size,
                max: self.max_size_bytes,
            });
        }

        let extension = file_extension(trimmed);
        if !self.allowed_extensions.iter().any(|e| e == &extension) {
            return Err(UploadValidationError::InvalidExtension(extension));
        }

        let content_type = content_type.trim().to_lowercase();
        if !self.allowed_content_types.iter().any(|c| c == &content_type) {
            return Err(UploadValidationError::InvalidContentType(
                content_type.to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_policy() -> UploadPolicy {
        UploadPolicy::new(
            100 * 1024 * 1024,
            vec!["mp4".to_string(), "mov".to_string()],
            vec!["video/mp4".to_string(), "video/quicktime".to_string()],
        )
    }

    #[test]
    fn test_valid_upload_passes() {
        assert!(video_policy()
            .validate("holiday.mp4", "video/mp4", 5 * 1024 * 1024)
            .is_ok());
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let result = video_policy().validate("big.mp4", "video/mp4", 500 * 1024 * 1024);
        assert!(matches!(
            result,
            Err(UploadValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert_eq!(
            video_policy().validate("zero.mp4", "video/mp4", 0),
            Err(UploadValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_disallowed_extension_is_rejected() {
        let result = video_policy().validate("script.exe", "video/mp4", 10);
        assert!(matches!(
            result,
            Err(UploadValidationError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_disallowed_content_type_is_rejected() {
        let result = video_policy().validate("clip.mp4", "application/octet-stream", 10);
        assert!(matches!(
            result,
            Err(UploadValidationError::InvalidContentType(_))
        ));
    }

    #[test]
    fn test_path_traversal_filenames_are_rejected() {
        for name in ["../../etc/passwd.mp4", "a/b.mp4", "a\\b.mp4", "  "] {
            let result = video_policy().validate(name, "video/mp4", 10);
            assert!(
                matches!(result, Err(UploadValidationError::InvalidFilename(_))),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_file_extension_extraction() {
        assert_eq!(file_extension("clip.MP4"), "mp4");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "bin");
    }
}
