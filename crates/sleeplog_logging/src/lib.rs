#![deny(missing_docs)]
//! Shared logging utilities for the sleeplog workspace.
//!
//! Library crates log through the `sleeplog_*` macros so that the `log`
//! facade is the only logging dependency they need. The front end decides
//! where records end up; tests use [`initialize_for_tests`].

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Reload epoch of the session driven by the current thread.
    static SESSION_EPOCH: Cell<u64> = const { Cell::new(0) };
}

/// Records the reload epoch of the session driven by the current thread.
///
/// The front end calls this after every page reload so that log lines can be
/// correlated with the session they belong to.
pub fn set_session_epoch(epoch: u64) {
    SESSION_EPOCH.with(|v| v.set(epoch));
}

/// Returns the reload epoch recorded for the current thread, or 0.
pub fn session_epoch() -> u64 {
    SESSION_EPOCH.with(|v| v.get())
}

/// Logs a trace-level message.
#[macro_export]
macro_rules! sleeplog_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! sleeplog_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! sleeplog_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message.
#[macro_export]
macro_rules! sleeplog_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! sleeplog_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Initializes a terminal logger for tests.
///
/// Safe to call from every test: it no-ops when a logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}
