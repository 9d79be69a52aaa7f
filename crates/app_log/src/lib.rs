//! Lumen Logging & Observability Module
//!
//! Provides structured logging, log retention and panic crash reports.

mod logging;
mod panic_hook;

pub use logging::{cleanup_old_logs, init_logging, LogGuard, LogOptions};
pub use panic_hook::{crash_report, init_panic_hook};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "Lumen", "Lumen")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features.
///
/// Keep the returned guard alive until exit so buffered file logs are flushed.
pub fn init(options: LogOptions) -> anyhow::Result<LogGuard> {
    let guard = init_logging(options)?;
    init_panic_hook();
    Ok(guard)
}
