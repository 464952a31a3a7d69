//! Session scripts: one JSON step per line.
//!
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"op":"set_text","text":"hi"}
//! {"op":"select","start":2,"end":2}
//! {"op":"key","event":{"kind":"emoji_pressed","emoji":{"type":"standard","name":"smile"}}}
//! {"op":"take_photo","reply":{"result":"items","items":[{"kind":"photo","path":"/tmp/a.heic","size_bytes":10,"mime_type":"image/jpeg"}]}}
//! {"op":"send"}
//! ```

use anyhow::Context;
use parlor_composer::{CaptureRequest, CaptureResult, KeyboardEvent, MicOrSend, UploadPolicy};
use serde::{Deserialize, Serialize};

/// What the scripted capture provider answers with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProviderReply {
    /// Files returned by the camera or picker
    Items { items: Vec<CaptureResult> },
    /// The user dismissed the picker
    Cancelled,
    /// The provider failed
    Error { message: String },
}

/// A single scripted interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    SetText { text: String },
    Select { start: usize, end: usize },
    Key { event: KeyboardEvent },
    OpenEmojiKeyboard,
    CloseEmojiKeyboard,
    /// Close the keyboard, then record `label` as the action that ran
    CloseEmojiKeyboardAndAction { label: String },
    KeyboardResigned,
    SetMicOrSend { mode: MicOrSend },
    Send,
    TakePhoto { reply: ProviderReply },
    TakeVideo { reply: ProviderReply },
    ChooseFromLibrary { reply: ProviderReply },
    ChooseFile { reply: ProviderReply },
    /// Replace the server's upload policy
    Policy { policy: UploadPolicy },
    /// Record the composer state at this point
    Snapshot,
}

impl ScriptStep {
    pub fn op(&self) -> &'static str {
        match self {
            ScriptStep::SetText { .. } => "set_text",
            ScriptStep::Select { .. } => "select",
            ScriptStep::Key { .. } => "key",
            ScriptStep::OpenEmojiKeyboard => "open_emoji_keyboard",
            ScriptStep::CloseEmojiKeyboard => "close_emoji_keyboard",
            ScriptStep::CloseEmojiKeyboardAndAction { .. } => "close_emoji_keyboard_and_action",
            ScriptStep::KeyboardResigned => "keyboard_resigned",
            ScriptStep::SetMicOrSend { .. } => "set_mic_or_send",
            ScriptStep::Send => "send",
            ScriptStep::Policy { .. } => "policy",
            ScriptStep::Snapshot => "snapshot",
            ScriptStep::TakePhoto { .. }
            | ScriptStep::TakeVideo { .. }
            | ScriptStep::ChooseFromLibrary { .. }
            | ScriptStep::ChooseFile { .. } => self
                .capture()
                .map(|(request, _)| request.as_str())
                .unwrap_or("capture"),
        }
    }

    /// The capture request and provider reply, for capture steps
    pub fn capture(&self) -> Option<(CaptureRequest, &ProviderReply)> {
        match self {
            ScriptStep::TakePhoto { reply } => Some((CaptureRequest::TakePhoto, reply)),
            ScriptStep::TakeVideo { reply } => Some((CaptureRequest::TakeVideo, reply)),
            ScriptStep::ChooseFromLibrary { reply } => {
                Some((CaptureRequest::ChooseFromLibrary, reply))
            }
            ScriptStep::ChooseFile { reply } => Some((CaptureRequest::ChooseFile, reply)),
            _ => None,
        }
    }
}

/// Parse a whole script
pub fn parse_script(source: &str) -> anyhow::Result<Vec<ScriptStep>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("script line {}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_composer::{CaptureKind, EmojiSelection};

    #[test]
    fn test_parse_script_skips_comments_and_blanks() {
        let steps = parse_script(
            r#"
# type, then send
{"op":"set_text","text":"hi"}

{"op":"send"}
"#,
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::SetText {
                    text: "hi".to_string()
                },
                ScriptStep::Send
            ]
        );
    }

    #[test]
    fn test_parse_key_event() {
        let steps = parse_script(
            r#"{"op":"key","event":{"kind":"emoji_pressed","emoji":{"type":"custom","name":"parrot","extension":"gif"}}}"#,
        )
        .unwrap();
        assert_eq!(
            steps[0],
            ScriptStep::Key {
                event: KeyboardEvent::EmojiPressed {
                    emoji: EmojiSelection::custom("parrot", Some("gif".to_string()))
                }
            }
        );
        assert_eq!(steps[0].op(), "key");
    }

    #[test]
    fn test_parse_capture_reply() {
        let steps = parse_script(
            r#"{"op":"choose_from_library","reply":{"result":"items","items":[{"kind":"photo","path":"/tmp/a.png","size_bytes":3,"mime_type":"image/png"}]}}
{"op":"take_video","reply":{"result":"cancelled"}}
{"op":"choose_file","reply":{"result":"error","message":"no storage"}}"#,
        )
        .unwrap();

        let (request, reply) = steps[0].capture().unwrap();
        assert_eq!(request, CaptureRequest::ChooseFromLibrary);
        let ProviderReply::Items { items } = reply else {
            panic!("expected items");
        };
        assert_eq!(items[0].kind, CaptureKind::Photo);
        assert_eq!(items[0].size_bytes, 3);

        assert_eq!(steps[1].op(), "take_video");
        assert_eq!(steps[1].capture().unwrap().1, &ProviderReply::Cancelled);
        assert_eq!(
            steps[2].capture().unwrap().1,
            &ProviderReply::Error {
                message: "no storage".to_string()
            }
        );
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_script("{\"op\":\"send\"}\n{\"op\":\"fly\"}").unwrap_err();
        assert!(err.to_string().contains("script line 2"));
    }
}
