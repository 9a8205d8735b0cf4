//! # Design
//!
//! - Subscription failures are fatal to the watcher and carry the watched path.
//! - Messages stay constant; the backend error is preserved as the source.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for trigger sources.
pub type TriggerResult<T> = Result<T, TriggerError>;

/// Errors raised by trigger sources.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Registering the recursive watch failed.
    #[error("failed to subscribe to filesystem events")]
    Subscribe {
        /// Directory that could not be watched.
        path: PathBuf,
        /// Backend error.
        source: notify::Error,
    },
    /// Removing the watch during shutdown failed.
    #[error("failed to unsubscribe from filesystem events")]
    Unsubscribe {
        /// Directory that was being watched.
        path: PathBuf,
        /// Backend error.
        source: notify::Error,
    },
}

impl TriggerError {
    pub(crate) fn subscribe(path: impl Into<PathBuf>, source: notify::Error) -> Self {
        Self::Subscribe {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsubscribe(path: impl Into<PathBuf>, source: notify::Error) -> Self {
        Self::Unsubscribe {
            path: path.into(),
            source,
        }
    }
}
