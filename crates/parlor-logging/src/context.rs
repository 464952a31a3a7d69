//! Room context injection for composer logging
//!
//! Thread-local storage for the room a composer is attached to, so every
//! span opened while the guard is alive can be tagged with `rid`/`tmid`.

use std::cell::RefCell;

use uuid::Uuid;

/// Room context data stored in thread-local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomContextData {
    /// Room id
    pub rid: String,
    /// Thread id, when composing in a thread
    pub tmid: Option<String>,
    /// Unique id for this composer session
    pub instance_id: Uuid,
}

thread_local! {
    static ROOM_CONTEXT: RefCell<Option<RoomContextData>> = const { RefCell::new(None) };
}

/// RAII guard for room context
///
/// When this guard is created, it sets the room context for the current thread.
/// When it's dropped, it restores the previous context (if any).
///
/// # Example
///
/// ```ignore
/// use parlor_logging::context::RoomContextGuard;
///
/// let _guard = RoomContextGuard::new("GENERAL", None);
///
/// // Spans opened in this scope carry rid = "GENERAL"
/// tracing::info!("sending message");
/// ```
pub struct RoomContextGuard {
    previous: Option<RoomContextData>,
}

impl RoomContextGuard {
    /// Set the room for the current scope
    pub fn new(rid: impl Into<String>, tmid: Option<String>) -> Self {
        Self::with_instance_id(rid, tmid, Uuid::new_v4())
    }

    /// Set the room with a caller-chosen session id
    pub fn with_instance_id(
        rid: impl Into<String>,
        tmid: Option<String>,
        instance_id: Uuid,
    ) -> Self {
        let previous = ROOM_CONTEXT.with(|ctx| ctx.borrow().clone());

        let new_ctx = RoomContextData {
            rid: rid.into(),
            tmid,
            instance_id,
        };

        ROOM_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(new_ctx));

        Self { previous }
    }

    /// Get the current room context (if any)
    pub fn current() -> Option<RoomContextData> {
        ROOM_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Get the current room id (if set)
    pub fn current_rid() -> Option<String> {
        Self::current().map(|ctx| ctx.rid)
    }
}

impl Drop for RoomContextGuard {
    fn drop(&mut self) {
        ROOM_CONTEXT.with(|ctx| *ctx.borrow_mut() = self.previous.take());
    }
}
