#![deny(missing_docs)]
//! Shared logging utilities for the promoter workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a per-thread worker label so pool threads can name their host in log lines,
//! and a minimal test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Thread-local label of the host a worker thread is bound to.
    static WORKER_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the worker label for the current thread.
/// Worker threads call this once, right after they are spawned.
pub fn set_worker_label(label: impl Into<String>) {
    let label = label.into();
    WORKER_LABEL.with(|v| *v.borrow_mut() = Some(label));
}

/// Retrieves the worker label for the current thread.
/// Returns `"main"` on threads that never set one.
pub fn worker_label() -> String {
    WORKER_LABEL.with(|v| v.borrow().clone().unwrap_or_else(|| "main".to_string()))
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
