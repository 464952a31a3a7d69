//! In-memory collaborators the replay session runs against

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use parlor_composer::{
    AttachmentRouter, CaptureError, CaptureProvider, CaptureResult, MessageSender, PickerConfig,
    UploadPolicy, UploadPolicySource,
};
use tracing::{debug, info};

use crate::script::ProviderReply;

/// Collects every sent message
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, text: String) {
        info!(len = text.len(), "message delivered");
        self.sent.lock().push(text);
    }
}

/// Answers the next capture with a queued reply; cancels when nothing is queued
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    next: Mutex<Option<ProviderReply>>,
    configs_seen: Mutex<Vec<PickerConfig>>,
}

impl ScriptedProvider {
    pub fn queue(&self, reply: ProviderReply) {
        *self.next.lock() = Some(reply);
    }

    pub fn configs_seen(&self) -> Vec<PickerConfig> {
        self.configs_seen.lock().clone()
    }

    fn take(&self) -> Result<Vec<CaptureResult>, CaptureError> {
        match self.next.lock().take() {
            Some(ProviderReply::Items { items }) => Ok(items
                .into_iter()
                .map(CaptureResult::with_default_filename)
                .collect()),
            Some(ProviderReply::Cancelled) | None => Err(CaptureError::Cancelled),
            Some(ProviderReply::Error { message }) => Err(CaptureError::Provider(message)),
        }
    }

    /// Camera and document picker return one file
    fn take_one(&self) -> Result<CaptureResult, CaptureError> {
        self.take()?
            .into_iter()
            .next()
            .ok_or(CaptureError::Cancelled)
    }
}

#[async_trait]
impl CaptureProvider for ScriptedProvider {
    async fn open_camera(&self, config: &PickerConfig) -> Result<CaptureResult, CaptureError> {
        debug!(media_type = ?config.media_type, "camera opened");
        self.configs_seen.lock().push(config.clone());
        self.take_one()
    }

    async fn open_picker(&self, config: &PickerConfig) -> Result<Vec<CaptureResult>, CaptureError> {
        debug!(multiple = config.multiple, "library picker opened");
        self.configs_seen.lock().push(config.clone());
        self.take()
    }

    async fn pick_document(&self) -> Result<CaptureResult, CaptureError> {
        debug!("document picker opened");
        self.take_one()
    }
}

/// Collects routed batches
#[derive(Debug, Default)]
pub struct RecordingRouter {
    batches: Mutex<Vec<Vec<CaptureResult>>>,
}

impl RecordingRouter {
    pub fn batches(&self) -> Vec<Vec<CaptureResult>> {
        self.batches.lock().clone()
    }
}

impl AttachmentRouter for RecordingRouter {
    fn route(&self, items: Vec<CaptureResult>) {
        info!(count = items.len(), "attachments handed to share view");
        self.batches.lock().push(items);
    }
}

/// Server settings that a script can change mid-session
#[derive(Debug, Default)]
pub struct SwappablePolicy {
    current: Mutex<UploadPolicy>,
}

impl SwappablePolicy {
    pub fn new(policy: UploadPolicy) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(policy),
        })
    }

    pub fn replace(&self, policy: UploadPolicy) {
        *self.current.lock() = policy;
    }
}

impl UploadPolicySource for SwappablePolicy {
    fn upload_policy(&self) -> UploadPolicy {
        self.current.lock().clone()
    }
}
