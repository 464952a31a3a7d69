//! Custom tracing layers
//!
//! [`RoomContextLayer`] stamps every new span with the active
//! [`RoomContextGuard`](crate::context::RoomContextGuard) data, both as a
//! span extension and as `rid`/`tmid`/`instance_id` fields in the span's
//! formatted output.

use std::fmt::Write as _;

use tracing::{Subscriber, span};
use tracing_subscriber::{
    fmt::{
        FormattedFields,
        format::{DefaultFields, JsonFields},
    },
    layer::{Context, Layer},
    registry::LookupSpan,
};

use crate::context::{RoomContextData, RoomContextGuard};

/// Layer that attaches room context to spans
///
/// Must sit outside the fmt layers (added after them) so their formatted
/// fields already exist when the room fields are appended.
pub struct RoomContextLayer;

impl RoomContextLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RoomContextLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct RoomContextExtension {
    pub data: RoomContextData,
}

impl<S> Layer<S> for RoomContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(room) = RoomContextGuard::current() else {
            return;
        };
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<FormattedFields<JsonFields>>() {
            append_json_fields(&mut fields.fields, &room);
        }
        if let Some(fields) = extensions.get_mut::<FormattedFields<DefaultFields>>() {
            append_text_fields(&mut fields.fields, &room);
        }
        extensions.insert(RoomContextExtension { data: room });
    }
}

/// Merge room fields into a JSON object; fields the span set itself win
fn append_json_fields(fields: &mut String, room: &RoomContextData) {
    let mut object = match serde_json::from_str::<serde_json::Value>(fields) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => serde_json::Map::new(),
    };
    object
        .entry("rid")
        .or_insert_with(|| room.rid.clone().into());
    if let Some(tmid) = &room.tmid {
        object.entry("tmid").or_insert_with(|| tmid.clone().into());
    }
    object
        .entry("instance_id")
        .or_insert_with(|| room.instance_id.to_string().into());

    if let Ok(json) = serde_json::to_string(&object) {
        *fields = json;
    }
}

fn append_text_fields(fields: &mut String, room: &RoomContextData) {
    if !fields.is_empty() {
        fields.push(' ');
    }
    let _ = write!(fields, "rid={}", room.rid);
    if let Some(tmid) = &room.tmid {
        let _ = write!(fields, " tmid={}", tmid);
    }
}

/// Create a JSONL formatting layer writing to `writer`
pub fn jsonl_layer<S, W>(
    writer: W,
    config: &crate::config::JsonlConfig,
) -> tracing_subscriber::fmt::Layer<
    S,
    tracing_subscriber::fmt::format::JsonFields,
    tracing_subscriber::fmt::format::Format<tracing_subscriber::fmt::format::Json>,
    W,
>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::{Registry, fmt::MakeWriter, layer::SubscriberExt};

    use crate::config::JsonlConfig;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn room_of(span: &tracing::Span) -> Option<String> {
        span.with_subscriber(|(id, dispatch)| {
            let registry = dispatch.downcast_ref::<Registry>()?;
            let data = registry.span(id)?;
            let extensions = data.extensions();
            extensions
                .get::<RoomContextExtension>()
                .map(|ext| ext.data.rid.clone())
        })
        .flatten()
    }

    #[test]
    fn test_span_carries_room_context() {
        let subscriber = Registry::default().with(RoomContextLayer::new());
        tracing::subscriber::with_default(subscriber, || {
            let _guard = RoomContextGuard::new("GENERAL", None);
            let span = tracing::info_span!("compose");
            assert_eq!(room_of(&span).as_deref(), Some("GENERAL"));
        });
    }

    #[test]
    fn test_span_without_guard_has_no_room() {
        let subscriber = Registry::default().with(RoomContextLayer::new());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("compose");
            assert!(room_of(&span).is_none());
        });
    }

    #[test]
    fn test_jsonl_events_carry_room_fields() {
        let buffer = SharedBuffer::default();
        let subscriber = Registry::default()
            .with(jsonl_layer(buffer.clone(), &JsonlConfig::default()))
            .with(RoomContextLayer::new());

        tracing::subscriber::with_default(subscriber, || {
            let _guard = RoomContextGuard::new("GENERAL", Some("t1".to_string()));
            let span = tracing::info_span!("send_message", len = 5);
            let _entered = span.enter();
            tracing::info!("message sent");
        });

        let line: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(line["span"]["rid"], "GENERAL");
        assert_eq!(line["span"]["tmid"], "t1");
        assert_eq!(line["span"]["len"], 5);
        assert!(line["span"]["instance_id"].is_string());
    }

    #[test]
    fn test_explicit_span_rid_wins() {
        let buffer = SharedBuffer::default();
        let subscriber = Registry::default()
            .with(jsonl_layer(buffer.clone(), &JsonlConfig::default()))
            .with(RoomContextLayer::new());

        tracing::subscriber::with_default(subscriber, || {
            let _guard = RoomContextGuard::new("GENERAL", None);
            let span = tracing::info_span!("forward", rid = "random");
            let _entered = span.enter();
            tracing::info!("forwarded");
        });

        let line: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(line["span"]["rid"], "random");
        assert!(line["span"].get("tmid").is_none());
    }

    #[test]
    fn test_text_fields_appended() {
        let buffer = SharedBuffer::default();
        let subscriber = Registry::default()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(buffer.clone()),
            )
            .with(RoomContextLayer::new());

        tracing::subscriber::with_default(subscriber, || {
            let _guard = RoomContextGuard::new("GENERAL", Some("t1".to_string()));
            let span = tracing::info_span!("send_message");
            let _entered = span.enter();
            tracing::info!("message sent");
        });

        assert!(buffer.contents().contains("send_message{rid=GENERAL tmid=t1}"));
    }
}
