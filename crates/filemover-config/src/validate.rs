//! Validation helpers and parsing utilities for configuration documents.

use std::path::PathBuf;

use chrono::NaiveTime;

use crate::error::{ConfigError, ConfigResult};

/// Format used for scheduled times in the configuration document (`11:00 AM`).
pub const MOVE_TIME_FORMAT: &str = "%I:%M %p";

/// Parse a 12-hour clock time with an AM/PM designator.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTime`] when the value does not match
/// [`MOVE_TIME_FORMAT`].
pub fn parse_move_time(value: &str) -> ConfigResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), MOVE_TIME_FORMAT).map_err(|source| {
        ConfigError::InvalidTime {
            value: value.to_string(),
            source,
        }
    })
}

/// Render a scheduled time back into the document format.
#[must_use]
pub fn format_move_time(time: NaiveTime) -> String {
    time.format(MOVE_TIME_FORMAT).to_string()
}

pub(crate) fn parse_move_times(values: &[String]) -> ConfigResult<Vec<NaiveTime>> {
    values.iter().map(|value| parse_move_time(value)).collect()
}

pub(crate) fn optional_dir(
    field: &'static str,
    value: Option<String>,
) -> ConfigResult<Option<PathBuf>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::InvalidField {
            field,
            reason: "empty",
            value: Some(raw),
        }),
        Some(raw) => Ok(Some(PathBuf::from(raw))),
    }
}

pub(crate) fn required_dir(field: &'static str, value: Option<String>) -> ConfigResult<PathBuf> {
    match value {
        // A blank `source_dir` is treated the same as an absent one.
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::MissingField { field }),
        other => optional_dir(field, other)?.ok_or(ConfigError::MissingField { field }),
    }
}
