//! Scripted composer sessions
//!
//! Replays a JSON-lines script of user interactions against a
//! [`parlor_composer::Composer`] wired to in-memory collaborators, and
//! reports what was sent, routed and shown.

pub mod cli;
pub mod fakes;
pub mod script;
pub mod session;

pub use cli::Cli;
pub use script::{ProviderReply, ScriptStep, parse_script};
pub use session::{CaptureRecord, ReplaySession, SessionOptions, SessionReport};
