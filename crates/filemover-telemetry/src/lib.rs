//! Logging setup shared by the file mover binary.
//!
//! Every event becomes one `<timestamp> - <LEVEL> - <message>` line appended to the log file.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod format;
pub mod init;

pub use error::{TelemetryError, TelemetryResult};
pub use format::{CRITICAL_TARGET, LineFormat, TIMESTAMP_FORMAT, level_label};
pub use init::{DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, LogGuard, LoggingConfig, init_logging};
