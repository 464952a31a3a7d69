//! Upload policy and the default validator.

use serde::{Deserialize, Serialize};

use crate::capture::CaptureResult;
use crate::error::ValidationError;
use crate::traits::{UploadPolicySource, UploadValidator};

/// Server-supplied upload constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Accepted media types (`image/png`, `image/*`) or extensions (`.pdf`).
    /// Empty, or containing `*`, accepts everything.
    pub allow_list: Vec<String>,
    /// Maximum size in bytes, inclusive (None = unlimited)
    pub max_file_size_bytes: Option<u64>,
    /// Whether the user may upload in this room
    pub permission_to_upload_file: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            max_file_size_bytes: None,
            permission_to_upload_file: true,
        }
    }
}

impl UploadPolicy {
    pub fn new(
        allow_list: Vec<String>,
        max_file_size_bytes: Option<u64>,
        permission: bool,
    ) -> Self {
        Self {
            allow_list,
            max_file_size_bytes,
            permission_to_upload_file: permission,
        }
    }

    /// Build from the server's settings form.
    ///
    /// `allow_list` is comma-separated; a negative `max_file_size` means no
    /// limit.
    pub fn from_server_settings(allow_list: &str, max_file_size: i64, permission: bool) -> Self {
        let allow_list = allow_list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        let max_file_size_bytes = u64::try_from(max_file_size).ok();
        Self::new(allow_list, max_file_size_bytes, permission)
    }

    /// Whether every media type is accepted
    pub fn allows_everything(&self) -> bool {
        self.allow_list.is_empty() || self.allow_list.iter().any(|entry| entry == "*")
    }

    /// Whether the file's media type or extension is on the allow list
    pub fn allows(&self, file: &CaptureResult) -> bool {
        if self.allows_everything() {
            return true;
        }
        let mime = file.mime_type.as_deref().map(str::to_ascii_lowercase);
        let extension = file.extension().map(|ext| ext.to_ascii_lowercase());

        self.allow_list.iter().any(|entry| {
            let entry = entry.to_ascii_lowercase();
            if let Some(ext) = entry.strip_prefix('.') {
                return extension.as_deref() == Some(ext);
            }
            let Some(mime) = mime.as_deref() else {
                return false;
            };
            match entry.strip_suffix("/*") {
                Some(top_level) => mime.split('/').next() == Some(top_level),
                None => mime == entry,
            }
        })
    }
}

/// Checks size, permission and type, in that order.
///
/// Files without a path have nothing to upload and always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyValidator;

impl UploadValidator for PolicyValidator {
    fn validate(&self, file: &CaptureResult, policy: &UploadPolicy) -> Result<(), ValidationError> {
        if file.path.as_deref().is_none_or(str::is_empty) {
            return Ok(());
        }

        if let Some(max_bytes) = policy.max_file_size_bytes {
            if file.size_bytes > max_bytes {
                return Err(ValidationError::FileTooLarge {
                    size_bytes: file.size_bytes,
                    max_bytes,
                });
            }
        }

        if !policy.permission_to_upload_file {
            return Err(ValidationError::PermissionDenied);
        }

        if !policy.allows(file) {
            return Err(ValidationError::InvalidFileType {
                mime_type: file.mime_type.clone(),
            });
        }

        Ok(())
    }
}

/// A fixed policy, for hosts whose settings never change mid-session.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy(pub UploadPolicy);

impl UploadPolicySource for StaticPolicy {
    fn upload_policy(&self) -> UploadPolicy {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureKind;

    fn file(mime: &str, size: u64) -> CaptureResult {
        CaptureResult::new(CaptureKind::Photo, "/tmp/IMG_0001.jpg", size, Some(mime))
    }

    fn jpeg_png_policy(max: u64) -> UploadPolicy {
        UploadPolicy::new(
            vec!["image/jpeg".into(), "image/png".into()],
            Some(max),
            true,
        )
    }

    #[test]
    fn test_size_boundary_is_inclusive() {
        let policy = jpeg_png_policy(1000);
        assert!(PolicyValidator.validate(&file("image/jpeg", 1000), &policy).is_ok());
        assert_eq!(
            PolicyValidator.validate(&file("image/jpeg", 1001), &policy),
            Err(ValidationError::FileTooLarge {
                size_bytes: 1001,
                max_bytes: 1000
            })
        );
    }

    #[test]
    fn test_heic_not_in_allow_list() {
        let policy = jpeg_png_policy(10_000);
        assert_eq!(
            PolicyValidator.validate(&file("image/heic", 10), &policy),
            Err(ValidationError::InvalidFileType {
                mime_type: Some("image/heic".into())
            })
        );
    }

    #[test]
    fn test_permission_required() {
        let mut policy = jpeg_png_policy(10_000);
        policy.permission_to_upload_file = false;
        assert_eq!(
            PolicyValidator.validate(&file("image/png", 10), &policy),
            Err(ValidationError::PermissionDenied)
        );
    }

    #[test]
    fn test_size_checked_before_permission() {
        let policy = UploadPolicy::new(vec![], Some(5), false);
        assert!(matches!(
            PolicyValidator.validate(&file("image/png", 10), &policy),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_wildcard_and_extension_entries() {
        let policy = UploadPolicy::from_server_settings("image/*, .PDF", -1, true);
        assert_eq!(policy.allow_list, vec!["image/*", ".PDF"]);
        assert_eq!(policy.max_file_size_bytes, None);

        assert!(policy.allows(&file("image/heic", 1)));
        let mut pdf = CaptureResult::new(CaptureKind::Document, "/tmp/report.pdf", 1, None);
        assert!(policy.allows(&pdf));
        pdf.mime_type = Some("video/mp4".into());
        pdf.filename = Some("clip.mp4".into());
        assert!(!policy.allows(&pdf));
    }

    #[test]
    fn test_empty_or_star_allows_everything() {
        assert!(UploadPolicy::from_server_settings("", 100, true).allows_everything());
        assert!(UploadPolicy::from_server_settings("*", 100, true).allows_everything());
        assert!(!UploadPolicy::from_server_settings("image/png", 100, true).allows_everything());
    }

    #[test]
    fn test_missing_path_passes() {
        let policy = UploadPolicy::new(vec!["image/png".into()], Some(1), false);
        let mut pathless = file("video/mp4", 10_000);
        pathless.path = None;
        assert!(PolicyValidator.validate(&pathless, &policy).is_ok());
    }

    #[test]
    fn test_missing_mime_fails_type_allow_list() {
        let policy = jpeg_png_policy(100);
        let unknown = CaptureResult::new(CaptureKind::Document, "/tmp/blob", 1, None);
        assert!(matches!(
            PolicyValidator.validate(&unknown, &policy),
            Err(ValidationError::InvalidFileType { mime_type: None })
        ));
    }

    #[test]
    fn test_static_policy_source() {
        let source = StaticPolicy(jpeg_png_policy(42));
        assert_eq!(source.upload_policy().max_file_size_bytes, Some(42));
    }
}
