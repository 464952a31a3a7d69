//! Error types for parlor-composer

use thiserror::Error;

/// Translation key for a file larger than the server allows
pub const ERROR_FILE_TOO_LARGE: &str = "error-file-too-large";
/// Translation key for a user lacking the upload permission
pub const ERROR_NOT_PERMISSION_TO_UPLOAD: &str = "error-not-permission-to-upload-file";
/// Translation key for a media type outside the allow list
pub const ERROR_INVALID_FILE_TYPE: &str = "error-invalid-file-type";

/// Errors reported by a capture provider (camera, library or document picker)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user dismissed the picker
    #[error("capture cancelled by user")]
    Cancelled,

    /// The provider itself failed; displays the provider's message as is
    #[error("{0}")]
    Provider(String),
}

impl CaptureError {
    /// Whether this error is a user cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CaptureError::Cancelled)
    }
}

/// Reasons a captured file is refused by the upload policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// File exceeds the maximum upload size
    #[error("{}", ERROR_FILE_TOO_LARGE)]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    /// The user may not upload files in this room
    #[error("{}", ERROR_NOT_PERMISSION_TO_UPLOAD)]
    PermissionDenied,

    /// Media type is not in the allow list
    #[error("{}", ERROR_INVALID_FILE_TYPE)]
    InvalidFileType { mime_type: Option<String> },

    /// Untranslated message from an injected validator
    #[error("{0}")]
    Other(String),
}

impl ValidationError {
    /// The message key shown to the user.
    ///
    /// For the built-in reasons this is a translation key; for
    /// [`ValidationError::Other`] it is the raw message.
    pub fn message_key(&self) -> String {
        self.to_string()
    }
}

/// Errors that can occur in the composer layer
#[derive(Debug, Error)]
pub enum ComposerError {
    /// A required collaborator was not supplied to the builder
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Configuration could not be read or parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error while loading configuration
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ComposerError {
    fn from(e: serde_json::Error) -> Self {
        ComposerError::Config(e.to_string())
    }
}

/// Result type for composer operations
pub type ComposerResult<T> = Result<T, ComposerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_keys() {
        let too_large = ValidationError::FileTooLarge {
            size_bytes: 1001,
            max_bytes: 1000,
        };
        assert_eq!(too_large.message_key(), ERROR_FILE_TOO_LARGE);
        assert_eq!(
            ValidationError::PermissionDenied.message_key(),
            ERROR_NOT_PERMISSION_TO_UPLOAD
        );
        assert_eq!(
            ValidationError::InvalidFileType { mime_type: None }.message_key(),
            ERROR_INVALID_FILE_TYPE
        );
        assert_eq!(
            ValidationError::Other("disk quota exceeded".into()).message_key(),
            "disk quota exceeded"
        );
    }

    #[test]
    fn test_cancellation_discriminator() {
        assert!(CaptureError::Cancelled.is_cancellation());
        assert!(!CaptureError::Provider("camera busy".into()).is_cancellation());
    }

    #[test]
    fn test_provider_message_is_raw() {
        assert_eq!(CaptureError::Provider("camera busy".into()).to_string(), "camera busy");
    }
}
