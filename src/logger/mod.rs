//! Structured logging system for lendmetrics
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored console output on stderr (stdout is reserved for result rows)
//!
//! ## Usage
//!
//! ```rust
//! use lendmetrics::logger::{self, LogTag};
//!
//! logger::error(LogTag::Metrics, "Adapter returned no borrow rate");
//! logger::warning(LogTag::Registry, "Adapter for aave_v3 replaced");
//! logger::info(LogTag::Batch, "Processed 42 markets");
//! logger::debug(LogTag::Metrics, "Normalized fields: ..."); // Only if --debug-metrics
//! logger::verbose(LogTag::Batch, "Raw record: ..."); // Only if --verbose
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, before any logging occurs:
//! ```rust
//! lendmetrics::logger::init();
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

// Re-export public types
pub use config::{ get_logger_config, init_from_args, set_logger_config, LoggerConfig };
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system from command-line arguments
///
/// Scans for --debug-<module>, --verbose and --quiet flags and configures
/// the filtering rules accordingly.
pub fn init() {
    config::init_from_args();
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
/// Debug logs are ONLY shown when the --debug-<module> flag for the tag is
/// provided.
///
/// # Example
/// ```rust
/// use lendmetrics::logger::{self, LogTag};
///
/// // Only shown with --debug-registry flag
/// logger::debug(LogTag::Registry, "Resolved adapter for compound_v2");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
