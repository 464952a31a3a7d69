//! # Parlor Composer
//!
//! Message composer core for Parlor chat clients.
//!
//! Owns the composer's state (mic/send mode, emoji keyboard and search bar)
//! and its input buffer, applies emoji keyboard edits at the cursor, and
//! runs camera/library/document captures through upload validation before
//! handing them to the attachment flow.
//!
//! ## Features
//!
//! - Cursor-aware emoji insertion and backspace in UTF-16 units
//! - Mutually exclusive emoji keyboard / search bar state
//! - Capture → normalize → validate → route pipeline with explicit outcomes
//! - Narrow per-control handles instead of a shared context object
//! - Collaborator traits for every platform dependency
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parlor_composer::{Composer, RoomContext, KeyboardEvent, EmojiSelection, UserNotice};
//!
//! let mut composer = Composer::builder(RoomContext::new("GENERAL"))
//!     .sender(Arc::new(my_sender))
//!     .shortcodes(Arc::new(ShortcodeTable::builtin()))
//!     .capture_provider(Arc::new(my_camera))
//!     .router(Arc::new(my_share_view))
//!     .policy(Arc::new(my_server_settings))
//!     .build()?;
//!
//! composer.on_change_text("hi");
//! composer.on_selection_change(Selection::caret(2));
//! composer.on_keyboard_item_selected(KeyboardEvent::EmojiPressed {
//!     emoji: EmojiSelection::standard("smile"),
//! });
//! assert_eq!(composer.text(), "hi🙂");
//!
//! let outcome = composer.take_photo().await;
//! if let Some(notice) = UserNotice::from_outcome(&outcome, &translator, "Error_uploading") {
//!     show_alert(notice.title, notice.message);
//! }
//!
//! composer.send_message().await;
//! ```

pub mod capture;
pub mod config;
pub mod controls;
pub mod coordinator;
pub mod editor;
pub mod emoji;
pub mod error;
pub mod notice;
pub mod policy;
pub mod state;
pub mod text;
pub mod traits;

// Re-exports
pub use capture::{
    CaptureKind, CaptureOutcome, CapturePipeline, CaptureRequest, CaptureResult, PipelinePhase,
    force_jpg_extension,
};
pub use config::{ComposerConfig, MediaType, PickerConfig};
pub use controls::{EmojiKeyboardControls, InputControls, MicOrSendControls, ToolbarControls};
pub use coordinator::{Composer, ComposerBuilder};
pub use editor::{EditOutcome, KeyboardEvent};
pub use emoji::{EmojiSelection, ShortcodeTable};
pub use error::{CaptureError, ComposerError, ComposerResult, ValidationError};
pub use notice::{TranslationTable, UserNotice};
pub use policy::{PolicyValidator, StaticPolicy, UploadPolicy};
pub use state::{ComposerSnapshot, ComposerState, EmojiPanel, MicOrSend, RoomContext};
pub use text::{Selection, TextEditState};
pub use traits::{
    AttachmentRouter, CaptureProvider, MessageSender, ShortcodeTranslator, Translator,
    UploadPolicySource, UploadValidator,
};
