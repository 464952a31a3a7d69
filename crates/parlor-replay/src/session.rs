//! Drives a [`Composer`] through a script and records what happened.

use std::sync::Arc;

use parlor_composer::{
    CaptureOutcome, CaptureRequest, CaptureResult, Composer, ComposerConfig, ComposerSnapshot,
    PickerConfig, PipelinePhase, RoomContext, Selection, ShortcodeTable, TranslationTable,
    UploadPolicy, UserNotice,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::fakes::{RecordingRouter, RecordingSender, ScriptedProvider, SwappablePolicy};
use crate::script::ScriptStep;

/// One capture invocation as seen by the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureRecord {
    pub request: CaptureRequest,
    pub phase: PipelinePhase,
    /// Items handed to the share view
    pub routed: Vec<CaptureResult>,
    /// Validation error key, or provider message
    pub error: Option<String>,
    pub notice: Option<UserNotice>,
}

/// Everything a replay produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub steps: usize,
    pub sent: Vec<String>,
    pub captures: Vec<CaptureRecord>,
    pub routed_batches: Vec<Vec<CaptureResult>>,
    pub picker_configs: Vec<PickerConfig>,
    pub actions: Vec<String>,
    pub snapshots: Vec<ComposerSnapshot>,
    #[serde(rename = "final")]
    pub final_state: ComposerSnapshot,
}

/// Options for a replay session
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub room: RoomContext,
    pub config: ComposerConfig,
    pub policy: UploadPolicy,
    pub shortcodes: ShortcodeTable,
}

pub struct ReplaySession {
    composer: Composer,
    sender: Arc<RecordingSender>,
    provider: Arc<ScriptedProvider>,
    router: Arc<RecordingRouter>,
    policy: Arc<SwappablePolicy>,
    translator: TranslationTable,
    steps: usize,
    captures: Vec<CaptureRecord>,
    actions: Vec<String>,
    snapshots: Vec<ComposerSnapshot>,
}

impl ReplaySession {
    pub fn new(options: SessionOptions) -> anyhow::Result<Self> {
        let sender = Arc::new(RecordingSender::default());
        let provider = Arc::new(ScriptedProvider::default());
        let router = Arc::new(RecordingRouter::default());
        let policy = SwappablePolicy::new(options.policy);

        let composer = Composer::builder(options.room)
            .config(options.config)
            .sender(sender.clone())
            .shortcodes(Arc::new(options.shortcodes))
            .capture_provider(provider.clone())
            .router(router.clone())
            .policy(policy.clone())
            .build()?;

        Ok(Self {
            composer,
            sender,
            provider,
            router,
            policy,
            translator: TranslationTable::english(),
            steps: 0,
            captures: Vec::new(),
            actions: Vec::new(),
            snapshots: Vec::new(),
        })
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Apply one step, going through the control handle a real view would use
    #[instrument(skip(self, step), fields(op = step.op()))]
    pub async fn apply(&mut self, step: ScriptStep) {
        self.steps += 1;

        if let Some((request, reply)) = step.capture() {
            self.provider.queue(reply.clone());
            let outcome = match request {
                CaptureRequest::TakePhoto => self.composer.toolbar_controls().take_photo().await,
                CaptureRequest::TakeVideo => self.composer.toolbar_controls().take_video().await,
                CaptureRequest::ChooseFromLibrary => {
                    self.composer.toolbar_controls().choose_from_library().await
                }
                CaptureRequest::ChooseFile => self.composer.toolbar_controls().choose_file().await,
            };
            self.record_capture(request, outcome);
            return;
        }

        match step {
            ScriptStep::SetText { text } => self.composer.input_controls().on_change_text(text),
            ScriptStep::Select { start, end } => self
                .composer
                .input_controls()
                .on_selection_change(Selection::new(start, end)),
            ScriptStep::Key { event } => self
                .composer
                .emoji_keyboard_controls()
                .on_keyboard_item_selected(event),
            ScriptStep::OpenEmojiKeyboard => self.composer.toolbar_controls().open_emoji_keyboard(),
            ScriptStep::CloseEmojiKeyboard => {
                self.composer.emoji_keyboard_controls().close_emoji_keyboard()
            }
            ScriptStep::CloseEmojiKeyboardAndAction { label } => {
                let actions = &mut self.actions;
                self.composer
                    .toolbar_controls()
                    .close_emoji_keyboard_and_action(|| actions.push(label));
            }
            ScriptStep::KeyboardResigned => self.composer.input_controls().on_keyboard_resigned(),
            ScriptStep::SetMicOrSend { mode } => {
                self.composer.mic_or_send_controls().set_mic_or_send(mode)
            }
            ScriptStep::Send => {
                self.composer.mic_or_send_controls().send_message().await;
            }
            ScriptStep::Policy { policy } => {
                debug!(permission = policy.permission_to_upload_file, "policy replaced");
                self.policy.replace(policy);
            }
            ScriptStep::Snapshot => self.snapshots.push(self.composer.snapshot()),
            ScriptStep::TakePhoto { .. }
            | ScriptStep::TakeVideo { .. }
            | ScriptStep::ChooseFromLibrary { .. }
            | ScriptStep::ChooseFile { .. } => {}
        }
    }

    pub async fn run(mut self, steps: Vec<ScriptStep>) -> SessionReport {
        for step in steps {
            self.apply(step).await;
        }
        self.finish()
    }

    pub fn finish(self) -> SessionReport {
        SessionReport {
            steps: self.steps,
            sent: self.sender.sent(),
            captures: self.captures,
            routed_batches: self.router.batches(),
            picker_configs: self.provider.configs_seen(),
            actions: self.actions,
            snapshots: self.snapshots,
            final_state: self.composer.snapshot(),
        }
    }

    fn record_capture(&mut self, request: CaptureRequest, outcome: CaptureOutcome) {
        let notice = UserNotice::from_outcome(
            &outcome,
            &self.translator,
            &self.composer.config().error_title_key,
        );
        let phase = outcome.phase();
        let (routed, error) = match outcome {
            CaptureOutcome::Routed { items } => (items, None),
            CaptureOutcome::Rejected { error, .. } => (Vec::new(), Some(error.message_key())),
            CaptureOutcome::ProviderFailed { message } => (Vec::new(), Some(message)),
            CaptureOutcome::Cancelled => (Vec::new(), None),
        };
        self.captures.push(CaptureRecord {
            request,
            phase,
            routed,
            error,
            notice,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ProviderReply, parse_script};
    use parlor_composer::{CaptureKind, MicOrSend};

    fn session() -> ReplaySession {
        ReplaySession::new(SessionOptions {
            room: RoomContext::new("GENERAL"),
            shortcodes: ShortcodeTable::builtin(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_emoji_insert_and_send() {
        let steps = parse_script(
            r#"{"op":"set_text","text":"hi"}
{"op":"select","start":2,"end":2}
{"op":"open_emoji_keyboard"}
{"op":"key","event":{"kind":"emoji_pressed","emoji":{"type":"standard","name":"smile"}}}
{"op":"snapshot"}
{"op":"key","event":{"kind":"backspace"}}
{"op":"send"}"#,
        )
        .unwrap();

        let report = session().run(steps).await;

        assert_eq!(report.steps, 7);
        assert_eq!(report.snapshots[0].text, "hi🙂");
        assert_eq!(report.snapshots[0].selection, Selection::caret(4));
        assert_eq!(report.snapshots[0].mic_or_send, MicOrSend::Send);
        assert!(report.snapshots[0].show_emoji_keyboard);
        assert_eq!(report.sent, vec!["hi".to_string()]);
        assert_eq!(report.final_state.text, "");
        assert_eq!(report.final_state.mic_or_send, MicOrSend::Mic);
    }

    #[tokio::test]
    async fn test_rejected_photo_produces_notice() {
        let mut session = session();
        session
            .apply(ScriptStep::Policy {
                policy: UploadPolicy::new(vec![], Some(1024), true),
            })
            .await;
        session
            .apply(ScriptStep::TakePhoto {
                reply: ProviderReply::Items {
                    items: vec![CaptureResult::new(
                        CaptureKind::Photo,
                        "/tmp/IMG_1.heic",
                        4096,
                        Some("image/jpeg"),
                    )],
                },
            })
            .await;

        let report = session.finish();
        let record = &report.captures[0];
        assert_eq!(record.phase, PipelinePhase::Rejected);
        assert_eq!(record.error.as_deref(), Some("error-file-too-large"));
        assert_eq!(
            record.notice,
            Some(UserNotice {
                title: "Error uploading".to_string(),
                message: "File is too large".to_string(),
            })
        );
        assert!(report.routed_batches.is_empty());
    }

    #[tokio::test]
    async fn test_routed_and_silent_outcomes() {
        let mut session = session();
        session
            .apply(ScriptStep::ChooseFromLibrary {
                reply: ProviderReply::Items {
                    items: vec![CaptureResult::new(
                        CaptureKind::Photo,
                        "/tmp/IMG_2.heic",
                        10,
                        Some("image/jpeg"),
                    )],
                },
            })
            .await;
        session
            .apply(ScriptStep::TakeVideo {
                reply: ProviderReply::Cancelled,
            })
            .await;
        session
            .apply(ScriptStep::ChooseFile {
                reply: ProviderReply::Error {
                    message: "picker crashed".to_string(),
                },
            })
            .await;

        let report = session.finish();
        assert_eq!(report.captures[0].phase, PipelinePhase::Routed);
        assert_eq!(
            report.captures[0].routed[0].filename.as_deref(),
            Some("IMG_2.jpg")
        );
        assert_eq!(report.routed_batches.len(), 1);

        assert_eq!(report.captures[1].phase, PipelinePhase::Cancelled);
        assert!(report.captures[1].notice.is_none());

        assert_eq!(report.captures[2].phase, PipelinePhase::Idle);
        assert_eq!(report.captures[2].error.as_deref(), Some("picker crashed"));
        assert!(report.captures[2].notice.is_none());

        // library and video pickers, not the document picker
        assert_eq!(report.picker_configs.len(), 2);
        assert!(report.picker_configs[0].multiple);
    }

    #[tokio::test]
    async fn test_close_keyboard_and_action_runs_once() {
        let mut session = session();
        session.apply(ScriptStep::OpenEmojiKeyboard).await;
        session
            .apply(ScriptStep::CloseEmojiKeyboardAndAction {
                label: "open_actions".to_string(),
            })
            .await;

        assert!(!session.composer().show_emoji_keyboard());
        let report = session.finish();
        assert_eq!(report.actions, vec!["open_actions".to_string()]);
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let report = session().run(vec![ScriptStep::Send]).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sent"][0], "");
        assert_eq!(json["final"]["rid"], "GENERAL");
        assert_eq!(json["final"]["mic_or_send"], "mic");
    }
}
