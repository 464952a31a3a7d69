//! Collaborator traits for the composer
//!
//! The composer never talks to a platform API directly. Everything outside
//! its own state sits behind one of these seams so hosts (and tests) can
//! plug in their own implementations.
//!
//! ## Key Traits
//!
//! - [`MessageSender`]: hands the finished message to the room
//! - [`ShortcodeTranslator`]: `:smile:` → `🙂`
//! - [`CaptureProvider`]: camera, media library and document pickers
//! - [`UploadValidator`]: size/type/permission checks
//! - [`UploadPolicySource`]: current server upload settings
//! - [`AttachmentRouter`]: share view / attachment hand-off
//! - [`Translator`]: localized strings for user notices

use async_trait::async_trait;

use crate::capture::CaptureResult;
use crate::config::PickerConfig;
use crate::error::{CaptureError, ValidationError};
use crate::policy::UploadPolicy;

/// Receives the composed message text.
///
/// Called once per send with the full buffer, which may be empty. Whether an
/// empty message is ignored is up to the implementation.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, text: String);
}

/// Resolves an emoji shortcode (with colons, e.g. `:smile:`) to its glyph.
///
/// Total: unknown shortcodes come back unchanged.
pub trait ShortcodeTranslator: Send + Sync {
    fn to_glyph(&self, shortcode: &str) -> String;
}

/// Platform camera and pickers.
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// Open the camera with a photo or video configuration
    async fn open_camera(&self, config: &PickerConfig) -> Result<CaptureResult, CaptureError>;

    /// Open the media library picker (may return several items)
    async fn open_picker(&self, config: &PickerConfig) -> Result<Vec<CaptureResult>, CaptureError>;

    /// Open the document picker for a single file
    async fn pick_document(&self) -> Result<CaptureResult, CaptureError>;
}

/// Decides whether a single file may be uploaded under a policy.
pub trait UploadValidator: Send + Sync {
    fn validate(&self, file: &CaptureResult, policy: &UploadPolicy) -> Result<(), ValidationError>;
}

/// Supplies the server's current upload settings.
///
/// Read on every validation; the composer never caches the result.
pub trait UploadPolicySource: Send + Sync {
    fn upload_policy(&self) -> UploadPolicy;
}

/// Takes validated attachments out of the composer (share view).
pub trait AttachmentRouter: Send + Sync {
    fn route(&self, items: Vec<CaptureResult>);
}

/// Localized string lookup.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;

    fn is_translated(&self, key: &str) -> bool;
}
