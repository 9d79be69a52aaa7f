//! Structured logging setup with tracing

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging knobs chosen by the binary
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directive used when `RUST_LOG` is unset
    pub default_directive: String,
    /// `None` disables the JSON file sink
    pub log_dir: Option<PathBuf>,
    /// Console output on stderr
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            log_dir: Some(super::log_dir()),
            console: true,
        }
    }
}

/// Flushes the file sink when dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system
pub fn init_logging(options: LogOptions) -> anyhow::Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_directive));

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "lumen.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().json().with_writer(non_blocking)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    // stdout is reserved for command output
    let console_layer = options.console.then(|| {
        #[cfg(debug_assertions)]
        {
            fmt::layer().pretty().with_writer(std::io::stderr).boxed()
        }
        #[cfg(not(debug_assertions))]
        {
            fmt::layer().compact().with_writer(std::io::stderr).boxed()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!("Logging initialized");
    Ok(LogGuard { _file: guard })
}

/// Clean up `.log` files in `log_dir` older than `days`
pub fn cleanup_old_logs(log_dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(days as u64 * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if !is_log_file(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if modified < threshold && std::fs::remove_file(&path).is_ok() {
            deleted += 1;
            tracing::debug!("Deleted old log: {:?}", path);
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

/// Daily rotation names files `lumen.log.YYYY-MM-DD`
fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".log") || name.contains(".log."))
}
