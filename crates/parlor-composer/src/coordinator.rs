//! The composer coordinator.
//!
//! [`Composer`] owns the composer state and the input buffer. It is the only
//! thing that mutates either; child controls get narrow handles from
//! [`crate::controls`] instead of the whole object.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, instrument};

use crate::capture::{CaptureOutcome, CapturePipeline, CaptureRequest};
use crate::config::ComposerConfig;
use crate::editor::{self, EditOutcome, KeyboardEvent};
use crate::emoji::ShortcodeTable;
use crate::error::{ComposerError, ComposerResult};
use crate::policy::PolicyValidator;
use crate::state::{ComposerSnapshot, ComposerState, EmojiPanel, MicOrSend, RoomContext};
use crate::text::{Selection, TextEditState, clamp_selection};
use crate::traits::{
    AttachmentRouter, CaptureProvider, MessageSender, ShortcodeTranslator, UploadPolicySource,
    UploadValidator,
};

/// Message composer for one room
pub struct Composer {
    room: RoomContext,
    state: ComposerState,
    input: TextEditState,
    config: Arc<ComposerConfig>,
    sender: Arc<dyn MessageSender>,
    shortcodes: Arc<dyn ShortcodeTranslator>,
    capture_provider: Arc<dyn CaptureProvider>,
    validator: Arc<dyn UploadValidator>,
    router: Arc<dyn AttachmentRouter>,
    policy: Arc<dyn UploadPolicySource>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("room", &self.room)
            .field("state", &self.state)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Composer {
    /// Start building a composer for `room`
    pub fn builder(room: RoomContext) -> ComposerBuilder {
        ComposerBuilder::new(room)
    }

    pub fn room(&self) -> &RoomContext {
        &self.room
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn input(&self) -> &TextEditState {
        &self.input
    }

    pub fn text(&self) -> &str {
        &self.input.text
    }

    pub fn selection(&self) -> Selection {
        self.input.selection
    }

    pub fn mic_or_send(&self) -> MicOrSend {
        self.state.mic_or_send
    }

    pub fn show_emoji_keyboard(&self) -> bool {
        self.state.show_emoji_keyboard()
    }

    pub fn show_emoji_searchbar(&self) -> bool {
        self.state.show_emoji_searchbar()
    }

    /// Upload permission as currently reported by the policy source
    pub fn permission_to_upload(&self) -> bool {
        self.policy.upload_policy().permission_to_upload_file
    }

    pub fn snapshot(&self) -> ComposerSnapshot {
        ComposerSnapshot {
            rid: self.room.rid.clone(),
            tmid: self.room.tmid.clone(),
            mic_or_send: self.state.mic_or_send,
            show_emoji_keyboard: self.state.show_emoji_keyboard(),
            show_emoji_searchbar: self.state.show_emoji_searchbar(),
            permission_to_upload: self.permission_to_upload(),
            text: self.input.text.clone(),
            selection: self.input.selection,
        }
    }

    /// Set the action button mode. Not checked against the buffer.
    pub fn set_mic_or_send(&mut self, mode: MicOrSend) {
        self.state.mic_or_send = mode;
    }

    /// Text typed into the input
    pub fn on_change_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let selection = clamp_selection(&text, self.input.selection);
        self.input = TextEditState { text, selection };
        self.sync_mic_or_send();
    }

    /// Selection moved in the input
    pub fn on_selection_change(&mut self, selection: Selection) {
        self.input.selection = clamp_selection(&self.input.text, selection);
    }

    /// Send the buffer and clear the input.
    ///
    /// Returns the text that was sent, which may be empty.
    #[instrument(skip(self), fields(rid = %self.room.rid))]
    pub async fn send_message(&mut self) -> String {
        let text = std::mem::take(&mut self.input.text);
        self.input.clear();
        self.state.mic_or_send = MicOrSend::Mic;

        info!(len = text.len(), "sending message");
        self.sender.send(text.clone()).await;
        text
    }

    pub fn open_emoji_keyboard(&mut self) {
        debug!(rid = %self.room.rid, "emoji keyboard opened");
        self.state.emoji_panel = EmojiPanel::Keyboard;
    }

    pub fn close_emoji_keyboard(&mut self) {
        debug!(rid = %self.room.rid, "emoji keyboard closed");
        self.state.emoji_panel = EmojiPanel::Hidden;
    }

    /// Close the emoji keyboard, then run `action` once
    pub fn close_emoji_keyboard_and_action<R>(&mut self, action: impl FnOnce() -> R) -> R {
        self.close_emoji_keyboard();
        action()
    }

    /// Handle an item from the emoji keyboard
    pub fn on_keyboard_item_selected(&mut self, event: KeyboardEvent) {
        match editor::apply(&self.input, &event, self.shortcodes.as_ref()) {
            EditOutcome::Edited(next) => {
                self.input = next;
                self.sync_mic_or_send();
            }
            EditOutcome::SearchRequested => {
                debug!(rid = %self.room.rid, "emoji search bar opened");
                self.state.emoji_panel = EmojiPanel::Searchbar;
            }
        }
    }

    /// The system keyboard went away; drop the emoji panel unless searching
    pub fn on_keyboard_resigned(&mut self) {
        if !self.state.show_emoji_searchbar() {
            self.close_emoji_keyboard();
        }
    }

    pub fn take_photo(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.capture(CaptureRequest::TakePhoto)
    }

    pub fn take_video(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.capture(CaptureRequest::TakeVideo)
    }

    pub fn choose_from_library(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.capture(CaptureRequest::ChooseFromLibrary)
    }

    pub fn choose_file(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.capture(CaptureRequest::ChooseFile)
    }

    /// Run a capture request through the upload pipeline.
    ///
    /// The upload policy is read now. The returned future does not borrow
    /// the composer, so text edits and keyboard events can be handled while
    /// the provider is still open.
    pub fn capture(
        &self,
        request: CaptureRequest,
    ) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        let policy = self.policy.upload_policy();
        let pipeline = CapturePipeline::new(
            self.capture_provider.clone(),
            self.validator.clone(),
            self.router.clone(),
            self.config.clone(),
        );
        let span = info_span!("capture", rid = %self.room.rid, request = request.as_str());
        async move { pipeline.run(request, &policy).await }.instrument(span)
    }

    fn sync_mic_or_send(&mut self) {
        self.state.mic_or_send = MicOrSend::for_text(&self.input.text);
    }
}

/// Builder for [`Composer`]
pub struct ComposerBuilder {
    room: RoomContext,
    config: ComposerConfig,
    sender: Option<Arc<dyn MessageSender>>,
    shortcodes: Option<Arc<dyn ShortcodeTranslator>>,
    capture_provider: Option<Arc<dyn CaptureProvider>>,
    validator: Option<Arc<dyn UploadValidator>>,
    router: Option<Arc<dyn AttachmentRouter>>,
    policy: Option<Arc<dyn UploadPolicySource>>,
}

impl ComposerBuilder {
    /// Create a new builder
    pub fn new(room: RoomContext) -> Self {
        Self {
            room,
            config: ComposerConfig::default(),
            sender: None,
            shortcodes: None,
            capture_provider: None,
            validator: None,
            router: None,
            policy: None,
        }
    }

    pub fn config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.room.editing = editing;
        self
    }

    pub fn sharing(mut self, sharing: bool) -> Self {
        self.room.sharing = sharing;
        self
    }

    /// Where sent messages go (required)
    pub fn sender(mut self, sender: Arc<dyn MessageSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Shortcode translator; defaults to pass-through
    pub fn shortcodes(mut self, shortcodes: Arc<dyn ShortcodeTranslator>) -> Self {
        self.shortcodes = Some(shortcodes);
        self
    }

    /// Camera and pickers (required)
    pub fn capture_provider(mut self, capture: Arc<dyn CaptureProvider>) -> Self {
        self.capture_provider = Some(capture);
        self
    }

    /// Upload validator; defaults to [`PolicyValidator`]
    pub fn validator(mut self, validator: Arc<dyn UploadValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Attachment hand-off (required)
    pub fn router(mut self, router: Arc<dyn AttachmentRouter>) -> Self {
        self.router = Some(router);
        self
    }

    /// Upload settings (required)
    pub fn policy(mut self, policy: Arc<dyn UploadPolicySource>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the composer
    pub fn build(self) -> ComposerResult<Composer> {
        Ok(Composer {
            room: self.room,
            state: ComposerState::default(),
            input: TextEditState::default(),
            config: Arc::new(self.config),
            sender: self.sender.ok_or(ComposerError::MissingCollaborator("sender"))?,
            shortcodes: self
                .shortcodes
                .unwrap_or_else(|| Arc::new(ShortcodeTable::new())),
            capture_provider: self
                .capture_provider
                .ok_or(ComposerError::MissingCollaborator("capture provider"))?,
            validator: self.validator.unwrap_or_else(|| Arc::new(PolicyValidator)),
            router: self.router.ok_or(ComposerError::MissingCollaborator("router"))?,
            policy: self.policy.ok_or(ComposerError::MissingCollaborator("policy"))?,
        })
    }
}
