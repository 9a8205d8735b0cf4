//! # Design
//!
//! - Centralize application-level errors for bootstrap and dispatch.
//! - Keep error messages constant while carrying the failing operation as context.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: filemover_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: filemover_telemetry::TelemetryError,
    },
    /// Trigger source operations failed.
    #[error("trigger operation failed")]
    Trigger {
        /// Operation identifier.
        operation: &'static str,
        /// Source trigger error.
        source: filemover_trigger::TriggerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: filemover_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: filemover_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn trigger(
        operation: &'static str,
        source: filemover_trigger::TriggerError,
    ) -> Self {
        Self::Trigger { operation, source }
    }
}
