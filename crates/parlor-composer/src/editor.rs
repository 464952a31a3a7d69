//! Cursor-aware emoji editing.
//!
//! Pure functions from `(text, selection, event)` to a new input state. They
//! never touch their inputs and hold no state of their own.

use serde::{Deserialize, Serialize};

use crate::emoji::{EmojiSelection, window_has_emoji};
use crate::text::{
    Selection, TextEditState, byte_offset, clamp_selection, snap_down, snap_up, units_between,
    utf16_len,
};
use crate::traits::ShortcodeTranslator;

/// Item selected on the emoji keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyboardEvent {
    /// Backspace key on the emoji keyboard
    Backspace,
    /// An emoji was tapped
    EmojiPressed { emoji: EmojiSelection },
    /// The search field was tapped
    SearchPressed,
}

/// Result of applying a [`KeyboardEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The input changed (or was left as is, e.g. backspace on empty text)
    Edited(TextEditState),
    /// No text change; the keyboard should switch to search mode
    SearchRequested,
}

/// Apply a keyboard event to the current input.
pub fn apply(
    state: &TextEditState,
    event: &KeyboardEvent,
    shortcodes: &dyn ShortcodeTranslator,
) -> EditOutcome {
    match event {
        KeyboardEvent::Backspace => EditOutcome::Edited(backspace(state)),
        KeyboardEvent::EmojiPressed { emoji } => {
            let glyph = emoji.resolve(shortcodes);
            EditOutcome::Edited(insert_at_cursor(state, &glyph))
        }
        KeyboardEvent::SearchPressed => EditOutcome::SearchRequested,
    }
}

/// Delete the character (or two-unit emoji) before the cursor.
///
/// An unset selection (`{0, 0}`) deletes from the end of the text. When the
/// two units before the cursor contain an emoji both are removed, otherwise
/// one. The removed span never splits a character.
pub fn backspace(state: &TextEditState) -> TextEditState {
    let text = state.text.as_str();
    let selection = clamp_selection(text, state.selection);
    let cursor = if selection.is_unset() {
        utf16_len(text)
    } else {
        selection.cursor()
    };

    if cursor == 0 {
        return TextEditState {
            text: state.text.clone(),
            selection: Selection::caret(0),
        };
    }

    let window = units_between(text, cursor.saturating_sub(2), cursor);
    let chars_to_remove = if window_has_emoji(&window) { 2 } else { 1 };
    let target = cursor.saturating_sub(chars_to_remove);

    // Prefer keeping a character the window only half covers, but always
    // delete something.
    let mut start = snap_up(text, target);
    if start >= cursor {
        start = snap_down(text, target);
    }

    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, cursor);
    let mut new_text = String::with_capacity(text.len());
    new_text.push_str(&text[..start_byte]);
    new_text.push_str(&text[end_byte..]);

    TextEditState {
        text: new_text,
        selection: Selection::caret(start),
    }
}

/// Splice `glyph` in at the cursor and move the caret past it.
pub fn insert_at_cursor(state: &TextEditState, glyph: &str) -> TextEditState {
    let text = state.text.as_str();
    let cursor = clamp_selection(text, state.selection).cursor();
    let at = byte_offset(text, cursor);

    let mut new_text = String::with_capacity(text.len() + glyph.len());
    new_text.push_str(&text[..at]);
    new_text.push_str(glyph);
    new_text.push_str(&text[at..]);

    TextEditState {
        text: new_text,
        selection: Selection::caret(cursor + utf16_len(glyph)),
    }
}
