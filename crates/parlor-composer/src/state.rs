//! Composer view state.

use serde::{Deserialize, Serialize};

use crate::text::Selection;

/// Which action button the composer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MicOrSend {
    /// Voice recording (empty buffer)
    #[default]
    Mic,
    /// Send text
    Send,
}

impl MicOrSend {
    /// Mode implied by the buffer contents
    pub fn for_text(text: &str) -> Self {
        if text.is_empty() {
            MicOrSend::Mic
        } else {
            MicOrSend::Send
        }
    }
}

/// Custom emoji panel shown below the input.
///
/// Keyboard and search bar are alternatives, so a single enum makes it
/// impossible to observe both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiPanel {
    #[default]
    Hidden,
    Keyboard,
    Searchbar,
}

/// State owned by the composer and read by its child controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComposerState {
    pub mic_or_send: MicOrSend,
    pub emoji_panel: EmojiPanel,
}

impl ComposerState {
    pub fn show_emoji_keyboard(&self) -> bool {
        self.emoji_panel == EmojiPanel::Keyboard
    }

    pub fn show_emoji_searchbar(&self) -> bool {
        self.emoji_panel == EmojiPanel::Searchbar
    }
}

/// Room the composer is attached to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomContext {
    /// Room id
    pub rid: String,
    /// Thread id when composing inside a thread
    #[serde(default)]
    pub tmid: Option<String>,
    /// Editing an existing message
    #[serde(default)]
    pub editing: bool,
    /// Composer hosted by the share view
    #[serde(default)]
    pub sharing: bool,
}

impl RoomContext {
    pub fn new(rid: impl Into<String>) -> Self {
        Self {
            rid: rid.into(),
            ..Default::default()
        }
    }

    pub fn in_thread(mut self, tmid: impl Into<String>) -> Self {
        self.tmid = Some(tmid.into());
        self
    }
}

/// Point-in-time view of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSnapshot {
    pub rid: String,
    pub tmid: Option<String>,
    pub mic_or_send: MicOrSend,
    pub show_emoji_keyboard: bool,
    pub show_emoji_searchbar: bool,
    pub permission_to_upload: bool,
    pub text: String,
    pub selection: Selection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_text() {
        assert_eq!(MicOrSend::for_text(""), MicOrSend::Mic);
        assert_eq!(MicOrSend::for_text("a"), MicOrSend::Send);
        assert_eq!(MicOrSend::for_text(" "), MicOrSend::Send);
    }

    #[test]
    fn test_panel_flags_exclusive() {
        for panel in [EmojiPanel::Hidden, EmojiPanel::Keyboard, EmojiPanel::Searchbar] {
            let state = ComposerState {
                emoji_panel: panel,
                ..Default::default()
            };
            assert!(!(state.show_emoji_keyboard() && state.show_emoji_searchbar()));
        }
    }

    #[test]
    fn test_room_context_builder() {
        let room = RoomContext::new("GENERAL").in_thread("t1");
        assert_eq!(room.rid, "GENERAL");
        assert_eq!(room.tmid.as_deref(), Some("t1"));
        assert!(!room.editing);
    }
}
