//! Error types for logging initialisation.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing the logging pipeline.
#[derive(Debug)]
pub enum TelemetryError {
    /// The log file could not be opened for appending.
    LogFile {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogFile { .. } => formatter.write_str("failed to open log file"),
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LogFile { source, .. } => Some(source),
            Self::SubscriberInstall { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::util::SubscriberInitExt;

    fn try_init_error() -> std::result::Result<tracing_subscriber::util::TryInitError, Box<dyn Error>>
    {
        match tracing_subscriber::registry().try_init() {
            Ok(()) => match tracing_subscriber::registry().try_init() {
                Ok(()) => Err(io::Error::other("expected init error").into()),
                Err(err) => Ok(err),
            },
            Err(err) => Ok(err),
        }
    }

    #[test]
    fn telemetry_error_display_and_source() -> std::result::Result<(), Box<dyn Error>> {
        let cases = vec![
            (
                TelemetryError::LogFile {
                    path: PathBuf::from("file_mover.log"),
                    source: io::Error::other("read-only"),
                },
                "failed to open log file",
            ),
            (
                TelemetryError::SubscriberInstall {
                    source: try_init_error()?,
                },
                "failed to install tracing subscriber",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
        Ok(())
    }
}
