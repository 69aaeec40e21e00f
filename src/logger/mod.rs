//! Structured logging for the subnet monitor
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via `--debug <tag>` flags
//! - Dual output: colored console + file persistence
//!
//! ## Usage
//!
//! ```rust
//! use subnet_monitor::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Connection failed");
//! logger::warning(LogTag::Storage, "History file unreadable, starting empty");
//! logger::info(LogTag::Poller, "Refresh cycle complete");
//! logger::debug(LogTag::Api, "GET /miners -> 42 entries"); // Only with --debug api
//! logger::verbose(LogTag::Charts, "Downsampled 1440 -> 206"); // Only with --verbose
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, after the CLI has been parsed:
//! ```rust
//! use subnet_monitor::logger::{self, LoggerConfig};
//!
//! logger::init(LoggerConfig::default());
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use file::daily_log_file_name;
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Installs the given configuration and opens the log file. Safe to call
/// more than once; later calls replace the configuration.
pub fn init(config: LoggerConfig) {
    set_logger_config(config);
    file::init_file_logging();
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
///
/// Warnings are shown by default (unless --quiet is used).
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Debug logs are ONLY shown when `--debug <tag>` names the tag.
///
/// # Example
/// ```rust
/// use subnet_monitor::logger::{self, LogTag};
///
/// // Only shown with --debug api
/// logger::debug(LogTag::Api, "Request headers: {...}");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
