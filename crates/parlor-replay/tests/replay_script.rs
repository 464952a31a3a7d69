//! Replays the bundled demo script end to end

use parlor_composer::{MicOrSend, PipelinePhase, RoomContext, Selection, ShortcodeTable};
use parlor_replay::{ReplaySession, SessionOptions, parse_script};

const HEIC_UPLOAD: &str = include_str!("../scripts/heic_upload.jsonl");

fn options() -> SessionOptions {
    SessionOptions {
        room: RoomContext::new("GENERAL").in_thread("t1"),
        shortcodes: ShortcodeTable::builtin(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_heic_upload_script() {
    let steps = parse_script(HEIC_UPLOAD).unwrap();
    let report = ReplaySession::new(options()).unwrap().run(steps).await;

    // Search bar pinned, so resigning the keyboard keeps it open
    let snapshot = &report.snapshots[0];
    assert_eq!(snapshot.text, "hi🙂");
    assert_eq!(snapshot.selection, Selection::caret(4));
    assert!(snapshot.show_emoji_searchbar);
    assert!(!snapshot.show_emoji_keyboard);
    assert_eq!(snapshot.tmid.as_deref(), Some("t1"));

    assert_eq!(report.captures.len(), 3);

    let rejected = &report.captures[0];
    assert_eq!(rejected.phase, PipelinePhase::Rejected);
    assert_eq!(rejected.error.as_deref(), Some("error-file-too-large"));
    assert_eq!(rejected.notice.as_ref().unwrap().title, "Error uploading");

    let routed = &report.captures[1];
    assert_eq!(routed.phase, PipelinePhase::Routed);
    assert_eq!(routed.routed[0].filename.as_deref(), Some("IMG_0002.jpg"));
    assert!(routed.notice.is_none());

    assert_eq!(report.captures[2].phase, PipelinePhase::Cancelled);
    assert_eq!(report.routed_batches.len(), 1);

    // Second send goes out empty; the sender decides what to do with it
    assert_eq!(report.sent, vec!["hi🙂".to_string(), String::new()]);
    assert_eq!(report.final_state.text, "");
    assert_eq!(report.final_state.mic_or_send, MicOrSend::Mic);
    assert!(!report.final_state.show_emoji_searchbar);
}

#[tokio::test]
async fn test_permission_revoked_mid_session() {
    let steps = parse_script(
        r#"{"op":"snapshot"}
{"op":"policy","policy":{"permission_to_upload_file":false}}
{"op":"choose_file","reply":{"result":"items","items":[{"kind":"document","path":"/tmp/report.pdf","size_bytes":10,"mime_type":"application/pdf"}]}}
{"op":"snapshot"}"#,
    )
    .unwrap();
    let report = ReplaySession::new(options()).unwrap().run(steps).await;

    assert!(report.snapshots[0].permission_to_upload);
    assert!(!report.snapshots[1].permission_to_upload);
    assert_eq!(report.captures[0].phase, PipelinePhase::Rejected);
    assert_eq!(
        report.captures[0].notice.as_ref().unwrap().message,
        "You don't have permission to upload files"
    );
}

#[tokio::test]
async fn test_set_mic_or_send_is_not_checked() {
    let steps = parse_script(r#"{"op":"set_mic_or_send","mode":"send"}"#).unwrap();
    let report = ReplaySession::new(options()).unwrap().run(steps).await;
    assert_eq!(report.final_state.mic_or_send, MicOrSend::Send);
    assert_eq!(report.final_state.text, "");
}
