//! Narrow handles handed to the composer's child controls.
//!
//! Each handle borrows the [`Composer`] and exposes only what its control
//! needs, so the input cannot open the camera and the toolbar cannot write
//! the buffer.

use std::future::Future;

use crate::capture::CaptureOutcome;
use crate::coordinator::Composer;
use crate::editor::KeyboardEvent;
use crate::state::MicOrSend;
use crate::text::Selection;

/// For the text input
pub struct InputControls<'a> {
    composer: &'a mut Composer,
}

impl InputControls<'_> {
    pub fn text(&self) -> &str {
        self.composer.text()
    }

    pub fn selection(&self) -> Selection {
        self.composer.selection()
    }

    pub fn on_change_text(&mut self, text: impl Into<String>) {
        self.composer.on_change_text(text);
    }

    pub fn on_selection_change(&mut self, selection: Selection) {
        self.composer.on_selection_change(selection);
    }

    /// Focus moved away from the system keyboard
    pub fn on_keyboard_resigned(&mut self) {
        self.composer.on_keyboard_resigned();
    }
}

/// For the toolbar below the input
pub struct ToolbarControls<'a> {
    composer: &'a mut Composer,
}

impl ToolbarControls<'_> {
    pub fn permission_to_upload(&self) -> bool {
        self.composer.permission_to_upload()
    }

    pub fn show_emoji_keyboard(&self) -> bool {
        self.composer.show_emoji_keyboard()
    }

    pub fn open_emoji_keyboard(&mut self) {
        self.composer.open_emoji_keyboard();
    }

    pub fn close_emoji_keyboard_and_action<R>(&mut self, action: impl FnOnce() -> R) -> R {
        self.composer.close_emoji_keyboard_and_action(action)
    }

    pub fn take_photo(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.composer.take_photo()
    }

    pub fn take_video(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.composer.take_video()
    }

    pub fn choose_from_library(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.composer.choose_from_library()
    }

    pub fn choose_file(&self) -> impl Future<Output = CaptureOutcome> + Send + use<> {
        self.composer.choose_file()
    }
}

/// For the custom emoji keyboard
pub struct EmojiKeyboardControls<'a> {
    composer: &'a mut Composer,
}

impl EmojiKeyboardControls<'_> {
    pub fn show_emoji_keyboard(&self) -> bool {
        self.composer.show_emoji_keyboard()
    }

    pub fn show_emoji_searchbar(&self) -> bool {
        self.composer.show_emoji_searchbar()
    }

    pub fn on_keyboard_item_selected(&mut self, event: KeyboardEvent) {
        self.composer.on_keyboard_item_selected(event);
    }

    pub fn close_emoji_keyboard(&mut self) {
        self.composer.close_emoji_keyboard();
    }
}

/// For the mic/send button
pub struct MicOrSendControls<'a> {
    composer: &'a mut Composer,
}

impl MicOrSendControls<'_> {
    pub fn mic_or_send(&self) -> MicOrSend {
        self.composer.mic_or_send()
    }

    pub fn set_mic_or_send(&mut self, mode: MicOrSend) {
        self.composer.set_mic_or_send(mode);
    }

    pub async fn send_message(&mut self) -> String {
        self.composer.send_message().await
    }
}

impl Composer {
    pub fn input_controls(&mut self) -> InputControls<'_> {
        InputControls { composer: self }
    }

    pub fn toolbar_controls(&mut self) -> ToolbarControls<'_> {
        ToolbarControls { composer: self }
    }

    pub fn emoji_keyboard_controls(&mut self) -> EmojiKeyboardControls<'_> {
        EmojiKeyboardControls { composer: self }
    }

    pub fn mic_or_send_controls(&mut self) -> MicOrSendControls<'_> {
        MicOrSendControls { composer: self }
    }
}
