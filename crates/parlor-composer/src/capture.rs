//! Capture-to-upload pipeline.
//!
//! One invocation walks `Idle → Capturing → Normalizing → Validating` and
//! ends in `Routed`, `Rejected` or `Cancelled`. A provider failure drops
//! back to `Idle`. The pipeline only reports what happened; whether that
//! deserves an alert is decided by [`crate::notice::UserNotice`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ComposerConfig;
use crate::error::{CaptureError, ValidationError};
use crate::policy::UploadPolicy;
use crate::traits::{AttachmentRouter, CaptureProvider, UploadValidator};

/// What kind of media a capture produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Photo,
    Video,
    Document,
}

/// A captured or picked file, consumed once by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub kind: CaptureKind,
    /// Local path or URI of the file
    #[serde(default)]
    pub path: Option<String>,
    /// Display filename; falls back to the last path segment
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl CaptureResult {
    pub fn new(
        kind: CaptureKind,
        path: impl Into<String>,
        size_bytes: u64,
        mime_type: Option<&str>,
    ) -> Self {
        Self {
            kind,
            path: Some(path.into()),
            filename: None,
            size_bytes,
            mime_type: mime_type.map(str::to_string),
        }
        .with_default_filename()
    }

    /// Take the filename from the last path segment when none was given
    pub fn with_default_filename(mut self) -> Self {
        if self.filename.is_none() {
            self.filename = self
                .path
                .as_deref()
                .and_then(|path| path.rsplit(['/', '\\']).next())
                .filter(|name| !name.is_empty())
                .map(str::to_string);
        }
        self
    }

    /// Extension of the filename (or path), without the dot
    pub fn extension(&self) -> Option<&str> {
        let name = self.filename.as_deref().or(self.path.as_deref())?;
        let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// Which capture the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureRequest {
    TakePhoto,
    TakeVideo,
    ChooseFromLibrary,
    ChooseFile,
}

impl CaptureRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureRequest::TakePhoto => "take_photo",
            CaptureRequest::TakeVideo => "take_video",
            CaptureRequest::ChooseFromLibrary => "choose_from_library",
            CaptureRequest::ChooseFile => "choose_file",
        }
    }
}

/// Pipeline phase, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Idle,
    Capturing,
    Normalizing,
    Validating,
    Routed,
    Rejected,
    Cancelled,
}

/// How a capture invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Every item passed validation and was handed to the router
    Routed { items: Vec<CaptureResult> },
    /// At least one item failed validation; nothing was routed
    Rejected {
        error: ValidationError,
        item: CaptureResult,
    },
    /// The user dismissed the picker (or picked nothing)
    Cancelled,
    /// The provider failed; logged, not shown to the user
    ProviderFailed { message: String },
}

impl CaptureOutcome {
    /// The phase the pipeline ended in
    pub fn phase(&self) -> PipelinePhase {
        match self {
            CaptureOutcome::Routed { .. } => PipelinePhase::Routed,
            CaptureOutcome::Rejected { .. } => PipelinePhase::Rejected,
            CaptureOutcome::Cancelled => PipelinePhase::Cancelled,
            CaptureOutcome::ProviderFailed { .. } => PipelinePhase::Idle,
        }
    }

    pub fn is_routed(&self) -> bool {
        matches!(self, CaptureOutcome::Routed { .. })
    }
}

/// Extensions that name a different encoding than JPEG
const NON_JPEG_IMAGE_EXTENSIONS: [&str; 7] = ["heic", "heif", "png", "gif", "webp", "bmp", "tiff"];

/// Make a JPEG's filename say `.jpg`.
///
/// `.heic`/`.heif` (and other image extensions) are replaced, a missing or
/// foreign extension gets `.jpg` appended, `.jpg`/`.jpeg` are kept. Items
/// that are not JPEG come back unchanged.
pub fn force_jpg_extension(mut item: CaptureResult) -> CaptureResult {
    let is_jpeg = item
        .mime_type
        .as_deref()
        .is_some_and(|mime| mime.eq_ignore_ascii_case("image/jpeg"));
    if !is_jpeg {
        return item;
    }
    let Some(filename) = item.filename.take() else {
        return item;
    };

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename.as_str(), None),
    };
    let renamed = match ext {
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => None,
        Some(ext)
            if !stem.is_empty()
                && NON_JPEG_IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            Some(format!("{}.jpg", stem))
        }
        _ => Some(format!("{}.jpg", filename)),
    };

    item.filename = Some(renamed.unwrap_or(filename));
    item
}

/// Runs one capture request through capture, normalization, validation and
/// routing.
///
/// Owns its collaborators so a capture in flight holds no borrow of the
/// composer.
#[derive(Clone)]
pub struct CapturePipeline {
    provider: Arc<dyn CaptureProvider>,
    validator: Arc<dyn UploadValidator>,
    router: Arc<dyn AttachmentRouter>,
    config: Arc<ComposerConfig>,
}

impl CapturePipeline {
    pub fn new(
        provider: Arc<dyn CaptureProvider>,
        validator: Arc<dyn UploadValidator>,
        router: Arc<dyn AttachmentRouter>,
        config: Arc<ComposerConfig>,
    ) -> Self {
        Self {
            provider,
            validator,
            router,
            config,
        }
    }

    /// Run the request against `policy`
    pub async fn run(&self, request: CaptureRequest, policy: &UploadPolicy) -> CaptureOutcome {
        debug!(request = request.as_str(), phase = ?PipelinePhase::Capturing, "capture started");

        let captured = match self.capture(request).await {
            Ok(items) => items,
            Err(error) if error.is_cancellation() => {
                debug!(
                    request = request.as_str(),
                    phase = ?PipelinePhase::Cancelled,
                    "capture cancelled"
                );
                return CaptureOutcome::Cancelled;
            }
            Err(error) => {
                warn!(request = request.as_str(), error = %error, "capture provider failed");
                return CaptureOutcome::ProviderFailed {
                    message: error.to_string(),
                };
            }
        };

        if captured.is_empty() {
            debug!(request = request.as_str(), "picker returned nothing");
            return CaptureOutcome::Cancelled;
        }

        debug!(count = captured.len(), phase = ?PipelinePhase::Normalizing, "normalizing");
        let items: Vec<CaptureResult> = if self.config.force_jpg_extension {
            captured.into_iter().map(force_jpg_extension).collect()
        } else {
            captured
        };

        debug!(count = items.len(), phase = ?PipelinePhase::Validating, "validating");
        for item in &items {
            if let Err(error) = self.validator.validate(item, policy) {
                warn!(
                    request = request.as_str(),
                    error = %error,
                    filename = item.filename.as_deref().unwrap_or_default(),
                    "upload rejected"
                );
                return CaptureOutcome::Rejected {
                    error,
                    item: item.clone(),
                };
            }
        }

        info!(request = request.as_str(), count = items.len(), "routing attachments");
        self.router.route(items.clone());
        CaptureOutcome::Routed { items }
    }

    async fn capture(&self, request: CaptureRequest) -> Result<Vec<CaptureResult>, CaptureError> {
        match request {
            CaptureRequest::TakePhoto => {
                let item = self.provider.open_camera(&self.config.photo).await?;
                Ok(vec![item])
            }
            CaptureRequest::TakeVideo => {
                let item = self.provider.open_camera(&self.config.video).await?;
                Ok(vec![item])
            }
            CaptureRequest::ChooseFromLibrary => {
                self.provider.open_picker(&self.config.library).await
            }
            CaptureRequest::ChooseFile => {
                let item = self.provider.pick_document().await?;
                Ok(vec![item])
            }
        }
    }
}
