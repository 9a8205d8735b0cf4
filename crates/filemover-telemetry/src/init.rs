//! Logging initialisation.
//!
//! # Design
//! - Every event is appended to a log file through a non-blocking writer; the returned
//!   [`LogGuard`] must live until shutdown so buffered lines are flushed.
//! - `RUST_LOG` overrides the configured level; a `critical=error` directive is always added
//!   so critical events survive per-crate filters.
//! - The console mirror is optional and uses the same line format.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{TelemetryError, TelemetryResult};
use crate::format::{CRITICAL_TARGET, LineFormat};

/// Log file written when none is configured.
pub const DEFAULT_LOG_FILE: &str = "file_mover.log";

/// Level used when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Level or filter directive (e.g., `debug`, `info`).
    pub level: &'a str,
    /// File that receives every log line.
    pub log_file: &'a Path,
    /// Mirror log lines to stderr.
    pub console: bool,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            log_file: Path::new(DEFAULT_LOG_FILE),
            console: false,
        }
    }
}

/// Keeps the background log writer alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops the log writer"]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::LogFile`] when the log file cannot be opened for appending, and
/// [`TelemetryError::SubscriberInstall`] when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig<'_>) -> TelemetryResult<LogGuard> {
    let file = open_log_file(config.log_file).map_err(|source| TelemetryError::LogFile {
        path: config.log_file.to_path_buf(),
        source,
    })?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let console = config.console.then(|| {
        fmt::layer()
            .event_format(LineFormat)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(
            fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(console)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })?;

    Ok(LogGuard { _file: guard })
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn build_env_filter(level: &str) -> EnvFilter {
    with_critical(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
}

/// Keep critical events visible under any filter, including per-crate `RUST_LOG` directives
/// that would otherwise drop the `critical` target.
fn with_critical(filter: EnvFilter) -> EnvFilter {
    match format!("{CRITICAL_TARGET}=error").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
