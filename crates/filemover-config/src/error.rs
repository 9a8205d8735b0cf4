//! Error types for configuration operations.
//!
//! # Design
//!
//! - Keep error messages constant; carry the offending field, path, or value as context.
//! - Preserve source errors so callers can render the full chain once.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the configuration document, or resolving a configured
    /// directory, failed.
    #[error("configuration io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the document or directory involved.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration document was not valid JSON for the expected shape.
    #[error("configuration json failure")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the configuration document.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// A field required for the selected mode was absent.
    #[error("missing configuration field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A scheduled time could not be parsed as a 12-hour clock time.
    #[error("invalid scheduled time")]
    InvalidTime {
        /// Raw time string provided by the document.
        value: String,
        /// Source chrono parse error.
        source: chrono::ParseError,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
