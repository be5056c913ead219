//! Structured logging for the bot
//!
//! Tagged, leveled console logging:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored console output (no log files are written)
//!
//! ## Usage
//!
//! ```rust
//! use towns_token_bot::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Connection failed");
//! logger::info(LogTag::Buy, "Confirmation form sent");
//! logger::debug(LogTag::Sessions, "Session created"); // Only if --debug-sessions
//! ```
//!
//! Call [`init`] once at startup, before any logging occurs.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger from command-line flags
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, only shown when --debug-<module> is set for the tag
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, only shown with --verbose
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
