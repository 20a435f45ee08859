#![deny(missing_docs)]
//! Shared logging utilities for the genflow workspace.
//!
//! This crate provides the `genflow_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every macro prefixes
//! its line with the generation job it belongs to. Async tasks carry their own
//! job through [`scope_job`]; synchronous code falls back to the value recorded
//! for its thread with [`set_active_job`].

use std::cell::Cell;
use std::future::Future;

thread_local! {
    /// Thread-local storage for the generation job currently being driven.
    static ACTIVE_JOB: Cell<u64> = const { Cell::new(0) };
}

tokio::task_local! {
    /// Job of the task being polled. Tasks sharing a runtime thread each keep their own.
    static TASK_JOB: u64;
}

/// Records the generation job the current thread is working on.
/// Pass 0 once no job is active.
pub fn set_active_job(job_id: u64) {
    ACTIVE_JOB.with(|v| v.set(job_id));
}

/// Runs `future` with its log lines attributed to `job_id`, whatever else
/// runs on the same thread. Pass 0 for work that belongs to no job.
pub fn scope_job<F: Future>(job_id: u64, future: F) -> impl Future<Output = F::Output> {
    TASK_JOB.scope(job_id, future)
}

/// Retrieves the job of the enclosing [`scope_job`], or else the one
/// recorded for the current thread. Returns 0 if neither is set.
pub fn active_job() -> u64 {
    TASK_JOB
        .try_with(|id| *id)
        .unwrap_or_else(|_| ACTIVE_JOB.with(|v| v.get()))
}

/// Prefix prepended by the logging macros: `[job N] ` or nothing.
#[doc(hidden)]
pub fn job_prefix() -> String {
    match active_job() {
        0 => String::new(),
        id => format!("[job {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! genflow_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! genflow_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! genflow_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! genflow_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! genflow_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
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
