// logging.rs - tracing setup for docmongo
// The core only emits `tracing` events; binaries call `init_logging` once.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log levels (ordered by severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Errors - driver failures, skipped documents
    Error = 0,
    /// Warnings - potential issues that don't stop execution
    Warn = 1,
    /// Info - connect/disconnect and result counts
    Info = 2,
    /// Debug - one event per dispatched operation
    Debug = 3,
    /// Trace - everything the driver stack emits
    Trace = 4,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<LogLevel> {
        match s.trim().to_uppercase().as_str() {
            "ERROR" => Some(LogLevel::Error),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "INFO" => Some(LogLevel::Info),
            "DEBUG" => Some(LogLevel::Debug),
            "TRACE" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warn
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise `default` for everything
pub fn env_filter(default: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default.as_str()))
}

/// Install the global fmt subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init_logging(default: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_target(true)
        .try_init();
}
