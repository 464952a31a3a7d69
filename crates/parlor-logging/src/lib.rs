//! Structured logging for Parlor clients
//!
//! Console output is JSONL by default so composer sessions can be piped
//! into log tooling; [`LogConfig::development`] switches to pretty output.
//! File output goes through `tracing-appender` with optional rotation.
//!
//! # Quick Start
//!
//! ```ignore
//! use parlor_logging::{LogConfig, ParlorSubscriberBuilder};
//!
//! // JSONL to stderr
//! let _guard = ParlorSubscriberBuilder::new().init();
//!
//! // Pretty output while hacking on the composer
//! let _guard = ParlorSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```
//!
//! # Room Context
//!
//! Use [`RoomContextGuard`] to tag every span in a scope with the room:
//!
//! ```ignore
//! use parlor_logging::RoomContextGuard;
//!
//! let _room = RoomContextGuard::new("GENERAL", None);
//! tracing::info!("opening composer");
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use context::{RoomContextData, RoomContextGuard};
pub use layers::{RoomContextExtension, RoomContextLayer};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to create log appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Global subscriber already set: {0}")]
    AlreadySet(#[from] tracing_subscriber::util::TryInitError),
}

/// Builder for configuring and initializing the Parlor logging subscriber
///
/// By default console output is JSONL on stderr. Stdout is left to the
/// program's own output.
pub struct ParlorSubscriberBuilder {
    config: LogConfig,
}

impl ParlorSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber globally
    ///
    /// The returned guard flushes file output on drop and must be kept
    /// alive for as long as logging is needed.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LogError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.config.filter_directives())?,
        };

        let registry = Registry::default().with(env_filter);

        let file = self
            .config
            .file
            .as_ref()
            .map(create_file_writer)
            .transpose()?;
        let jsonl = &self.config.jsonl;
        let console = &self.config.console;

        // One arm per layer combination; fmt layers differ in type. The room
        // layer goes last so it sees the spans' formatted fields.
        match (console.enabled, console.pretty, file) {
            (true, true, Some((writer, guard))) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr);
                registry
                    .with(console_layer)
                    .with(layers::jsonl_layer(writer, jsonl))
                    .with(RoomContextLayer::new())
                    .try_init()?;
                Ok(Some(guard))
            }
            (true, false, Some((writer, guard))) => {
                registry
                    .with(layers::jsonl_layer(std::io::stderr, jsonl))
                    .with(layers::jsonl_layer(writer, jsonl))
                    .with(RoomContextLayer::new())
                    .try_init()?;
                Ok(Some(guard))
            }
            (false, _, Some((writer, guard))) => {
                registry
                    .with(layers::jsonl_layer(writer, jsonl))
                    .with(RoomContextLayer::new())
                    .try_init()?;
                Ok(Some(guard))
            }
            (true, true, None) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .with_writer(std::io::stderr);
                registry
                    .with(console_layer)
                    .with(RoomContextLayer::new())
                    .try_init()?;
                Ok(None)
            }
            (true, false, None) => {
                registry
                    .with(layers::jsonl_layer(std::io::stderr, jsonl))
                    .with(RoomContextLayer::new())
                    .try_init()?;
                Ok(None)
            }
            (false, _, None) => {
                registry.with(RoomContextLayer::new()).try_init()?;
                Ok(None)
            }
        }
    }

    /// Install the subscriber, reporting failures on stderr
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: failed to initialize logging: {}", e);
                None
            }
        }
    }
}

impl Default for ParlorSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncates for `Never` rotation, appends for the others
fn create_file_writer(file_config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LogError> {
    fs::create_dir_all(&file_config.directory)?;
    let rotation = match file_config.rotation {
        RotationStrategy::Never => {
            let path = file_config
                .directory
                .join(format!("{}.log", file_config.prefix));
            let file = File::create(path)?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&file_config.prefix)
        .filename_suffix("log")
        .build(&file_config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// JSONL console output at the default level
pub fn init_default() -> Option<WorkerGuard> {
    ParlorSubscriberBuilder::new().init()
}

/// Pretty console output at debug level
pub fn init_development() -> Option<WorkerGuard> {
    ParlorSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Warnings only; safe to call from several tests
pub fn init_testing() {
    let _ = ParlorSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
