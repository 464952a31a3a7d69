//! Text buffer and selection state for the composer input.
//!
//! All offsets are measured in UTF-16 code units, the unit the platform
//! text input reports selections in. An astral-plane emoji such as `🙂`
//! therefore has length 2. Offsets that would land inside a surrogate pair
//! are snapped to a character boundary so the buffer stays valid UTF-8.

use serde::{Deserialize, Serialize};

/// Selection range within the input, in UTF-16 code units.
///
/// `start == end` is a plain caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection from raw platform values (not yet clamped).
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A collapsed selection at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Cursor position derived from the selection (`max(start, end)`).
    pub fn cursor(&self) -> usize {
        self.start.max(self.end)
    }

    /// Whether the selection was never set by the input (`{0, 0}`).
    pub fn is_unset(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Restore `0 <= start <= end <= len`.
    pub fn clamped(self, len: usize) -> Self {
        let a = self.start.min(len);
        let b = self.end.min(len);
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }
}

/// Current contents of the composer input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEditState {
    pub text: String,
    pub selection: Selection,
}

impl TextEditState {
    /// Build a state, clamping the selection into the text.
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        let text = text.into();
        let selection = clamp_selection(&text, selection);
        Self { text, selection }
    }

    /// Text with the caret after its last character.
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = utf16_len(&text);
        Self {
            text,
            selection: Selection::caret(len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Reset to an empty buffer with the caret at `{0, 0}`.
    pub fn clear(&mut self) {
        self.text.clear();
        self.selection = Selection::default();
    }
}

/// Clamp a selection into `text` and snap both ends off surrogate pairs.
pub fn clamp_selection(text: &str, selection: Selection) -> Selection {
    let clamped = selection.clamped(utf16_len(text));
    Selection {
        start: snap_down(text, clamped.start),
        end: snap_down(text, clamped.end),
    }
}

/// Number of UTF-16 code units in `text`.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte index of the last character boundary at or before `units`.
pub fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (idx, ch) in text.char_indices() {
        let next = seen + ch.len_utf16();
        if next > units {
            return idx;
        }
        seen = next;
    }
    text.len()
}

/// Largest unit offset `<= units` that falls on a character boundary.
pub fn snap_down(text: &str, units: usize) -> usize {
    utf16_len(&text[..byte_offset(text, units)])
}

/// Smallest unit offset `>= units` that falls on a character boundary.
pub fn snap_up(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for ch in text.chars() {
        if seen >= units {
            return seen;
        }
        seen += ch.len_utf16();
    }
    seen
}

/// The raw UTF-16 code units in `[start, end)`.
pub fn units_between(text: &str, start: usize, end: usize) -> Vec<u16> {
    text.encode_utf16()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
