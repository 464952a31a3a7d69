//! Emoji glyph resolution and multi-unit detection.
//!
//! Backspace needs to know whether the last two UTF-16 units of the input
//! form (or contain) an emoji so it can drop both at once. The check is a
//! table lookup over the ranges below. It only ever looks at two units, so
//! flag sequences and ZWJ-joined emoji are removed piecewise.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComposerResult;
use crate::traits::ShortcodeTranslator;

/// Single BMP code units treated as emoji: `©`, `®`, and the general
/// punctuation through CJK symbols block (dingbats, arrows, misc symbols).
pub const EMOJI_SYMBOL_RANGES: [RangeInclusive<u16>; 3] =
    [0x00A9..=0x00A9, 0x00AE..=0x00AE, 0x2000..=0x3300];

/// High surrogates that start the emoji planes (U+1F000..U+1FBFF).
pub const EMOJI_SURROGATE_LEADS: [u16; 3] = [0xD83C, 0xD83D, 0xD83E];

/// Units accepted after an emoji lead surrogate.
pub const EMOJI_SURROGATE_TRAILS: RangeInclusive<u16> = 0xD000..=0xDFFF;

/// Whether `window` contains an emoji symbol unit or an emoji surrogate pair.
pub fn window_has_emoji(window: &[u16]) -> bool {
    let symbol = window
        .iter()
        .any(|unit| EMOJI_SYMBOL_RANGES.iter().any(|r| r.contains(unit)));
    let pair = window.windows(2).any(|w| {
        EMOJI_SURROGATE_LEADS.contains(&w[0]) && EMOJI_SURROGATE_TRAILS.contains(&w[1])
    });
    symbol || pair
}

/// An emoji chosen on the emoji keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmojiSelection {
    /// A standard emoji identified by its shortcode name (`smile`)
    Standard { name: String },
    /// A server-defined custom emoji; inserted as `:name:`
    Custom {
        name: String,
        #[serde(default)]
        extension: Option<String>,
    },
}

impl EmojiSelection {
    pub fn standard(name: impl Into<String>) -> Self {
        EmojiSelection::Standard { name: name.into() }
    }

    pub fn custom(name: impl Into<String>, extension: Option<String>) -> Self {
        EmojiSelection::Custom {
            name: name.into(),
            extension,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EmojiSelection::Standard { name } | EmojiSelection::Custom { name, .. } => name,
        }
    }

    /// Text to splice into the input for this emoji.
    pub fn resolve(&self, translator: &dyn ShortcodeTranslator) -> String {
        match self {
            EmojiSelection::Standard { name } => translator.to_glyph(&shortcode(name)),
            EmojiSelection::Custom { name, .. } => shortcode(name),
        }
    }
}

/// Wrap a bare name in colons (`smile` → `:smile:`).
pub fn shortcode(name: &str) -> String {
    let trimmed = name.trim_matches(':');
    format!(":{}:", trimmed)
}

/// In-memory shortcode table.
///
/// Keys are stored without colons; lookups accept either form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcodeTable {
    glyphs: HashMap<String, String>,
}

impl ShortcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small built-in table covering common reactions.
    pub fn builtin() -> Self {
        [
            ("smile", "🙂"),
            ("grinning", "😀"),
            ("joy", "😂"),
            ("heart", "❤️"),
            ("thumbsup", "👍"),
            ("tada", "🎉"),
            ("wave", "👋"),
            ("fire", "🔥"),
            ("copyright", "©"),
            ("check", "✔"),
        ]
        .into_iter()
        .collect()
    }

    pub fn with(mut self, name: &str, glyph: impl Into<String>) -> Self {
        self.insert(name, glyph);
        self
    }

    pub fn insert(&mut self, name: &str, glyph: impl Into<String>) {
        self.glyphs
            .insert(name.trim_matches(':').to_string(), glyph.into());
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Parse a JSON object of `name -> glyph`.
    pub fn from_json_str(json: &str) -> ComposerResult<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(raw.into_iter().fold(Self::new(), |mut table, (name, glyph)| {
            table.insert(&name, glyph);
            table
        }))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ComposerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Add every entry of `other`, replacing existing glyphs
    pub fn merge(&mut self, other: ShortcodeTable) {
        self.glyphs.extend(other.glyphs);
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ShortcodeTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (name, glyph) in iter {
            table.insert(name, glyph);
        }
        table
    }
}

impl ShortcodeTranslator for ShortcodeTable {
    fn to_glyph(&self, shortcode: &str) -> String {
        self.glyphs
            .get(shortcode.trim_matches(':'))
            .cloned()
            .unwrap_or_else(|| shortcode.to_string())
    }
}
