//! Logging setup for LAN Lab
//!
//! The simulator logs through the `tracing` facade only; this crate decides
//! where those events end up. With no subscriber installed the engine runs
//! unchanged and its events are simply discarded.
//!
//! # Quick Start
//!
//! ```ignore
//! use lanlab_logging::{LabSubscriberBuilder, LogConfig};
//!
//! // Pretty console output at info
//! let _guard = LabSubscriberBuilder::new().init();
//!
//! // JSON lines to console plus a log file
//! let _guard = LabSubscriberBuilder::new()
//!     .with_json_console()
//!     .with_file_output(FileConfig::default())
//!     .init();
//! ```
//!
//! Keep the returned guard alive for as long as file output is needed.

pub mod config;
pub mod context;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use context::{SessionContextData, SessionContextGuard};
pub use tracing_appender::non_blocking::WorkerGuard;

use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, filter::ParseError, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("Failed to open log file: {0}")]
    File(#[from] InitError),

    #[error("A global subscriber is already set: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builder for configuring and initializing the LAN Lab subscriber
pub struct LabSubscriberBuilder {
    config: LogConfig,
}

impl LabSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: pretty console output at `info`
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

    /// Switch console output to JSON lines
    pub fn with_json_console(mut self) -> Self {
        self.config.console.pretty = false;
        self.config.console.ansi = false;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Install the subscriber globally, warning on stderr if that fails
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }

    /// Install the subscriber globally
    ///
    /// Returns the file writer guard when file output is configured.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.config.default_level)?,
        };

        let console = &self.config.console;
        let jsonl = &self.config.jsonl;

        let pretty_console = (console.enabled && console.pretty).then(|| {
            tracing_subscriber::fmt::layer()
                .with_ansi(console.ansi)
                .with_target(true)
        });

        let json_console = (console.enabled && !console.pretty).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(jsonl.include_spans)
                .flatten_event(jsonl.flatten_events)
                .with_file(jsonl.include_location)
                .with_line_number(jsonl.include_location)
        });

        let (file_layer, guard) = match &self.config.file {
            Some(file_config) => {
                let appender = RollingFileAppender::builder()
                    .rotation(rotation_for(file_config.rotation))
                    .filename_prefix(file_config.prefix.clone())
                    .filename_suffix("log")
                    .build(&file_config.directory)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(jsonl.include_spans)
                    .flatten_event(jsonl.flatten_events)
                    .with_file(jsonl.include_location)
                    .with_line_number(jsonl.include_location)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(pretty_console)
            .with(json_console)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }
}

impl Default for LabSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn rotation_for(strategy: RotationStrategy) -> Rotation {
    match strategy {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    }
}

/// Initialize logging with default settings (pretty console, info)
pub fn init_default() {
    LabSubscriberBuilder::new().init();
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() {
    LabSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init();
}

/// Initialize logging for testing (minimal output, ignores double init)
pub fn init_testing() {
    let _ = LabSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
