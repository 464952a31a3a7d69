//! User-facing notices for capture outcomes.
//!
//! Only a policy rejection is shown to the user. Cancellations and provider
//! failures are already traced by the pipeline and produce no notice.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureOutcome;
use crate::traits::Translator;

/// An alert to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub title: String,
    pub message: String,
}

impl UserNotice {
    /// Alert for `outcome`, if it deserves one.
    ///
    /// The message is the translation of the error key when the translator
    /// knows it, otherwise the raw error text.
    pub fn from_outcome(
        outcome: &CaptureOutcome,
        translator: &dyn Translator,
        title_key: &str,
    ) -> Option<Self> {
        let CaptureOutcome::Rejected { error, .. } = outcome else {
            return None;
        };
        let key = error.message_key();
        let message = if translator.is_translated(&key) {
            translator.translate(&key)
        } else {
            key
        };
        Some(Self {
            title: translator.translate(title_key),
            message,
        })
    }
}

/// In-memory translation table; unknown keys translate to themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    strings: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// English strings for the composer's own keys
    pub fn english() -> Self {
        Self::new()
            .with("Error_uploading", "Error uploading")
            .with("error-file-too-large", "File is too large")
            .with(
                "error-not-permission-to-upload-file",
                "You don't have permission to upload files",
            )
            .with("error-invalid-file-type", "File type is not accepted")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }
}

impl Translator for TranslationTable {
    fn translate(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn is_translated(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureKind, CaptureResult};
    use crate::error::ValidationError;

    fn rejected(error: ValidationError) -> CaptureOutcome {
        CaptureOutcome::Rejected {
            error,
            item: CaptureResult::new(CaptureKind::Photo, "/tmp/a.heic", 1, Some("image/heic")),
        }
    }

    #[test]
    fn test_rejection_is_translated() {
        let notice = UserNotice::from_outcome(
            &rejected(ValidationError::InvalidFileType { mime_type: None }),
            &TranslationTable::english(),
            "Error_uploading",
        )
        .unwrap();
        assert_eq!(notice.title, "Error uploading");
        assert_eq!(notice.message, "File type is not accepted");
    }

    #[test]
    fn test_untranslated_error_shows_raw_string() {
        let notice = UserNotice::from_outcome(
            &rejected(ValidationError::Other("quota exceeded".into())),
            &TranslationTable::english(),
            "Error_uploading",
        )
        .unwrap();
        assert_eq!(notice.message, "quota exceeded");
    }

    #[test]
    fn test_no_notice_for_other_outcomes() {
        let table = TranslationTable::english();
        for outcome in [
            CaptureOutcome::Cancelled,
            CaptureOutcome::ProviderFailed {
                message: "camera busy".into(),
            },
            CaptureOutcome::Routed { items: vec![] },
        ] {
            assert!(UserNotice::from_outcome(&outcome, &table, "Error_uploading").is_none());
        }
    }
}
