//! Typed configuration models.
//!
//! # Design
//! - `ConfigDocument` mirrors the JSON document byte-for-byte; `ConfigRecord` is the
//!   validated form the daemon consumes.
//! - Keep domain types separate from IO code in `loader.rs`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::validate::{format_move_time, optional_dir, parse_move_times, required_dir};

/// Raw JSON shape of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Directory watched for incoming files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    /// Flat staging directory receiving basenames only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_dir: Option<String>,
    /// Archive directory receiving structured or date-bucketed copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dated_dir: Option<String>,
    /// Scheduled trigger times in `HH:MM AM` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_times: Option<Vec<String>>,
}

/// Validated configuration record loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    /// Directory watched for incoming files.
    pub source_dir: PathBuf,
    /// Flat staging directory, when configured.
    pub flat_dir: Option<PathBuf>,
    /// Archive directory, when configured.
    pub dated_dir: Option<PathBuf>,
    /// Scheduled trigger times, in document order.
    pub move_times: Vec<NaiveTime>,
}

impl ConfigRecord {
    /// Build a record with all three directories set and no schedule.
    #[must_use]
    pub fn new(
        source_dir: impl Into<PathBuf>,
        flat_dir: impl Into<PathBuf>,
        dated_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            flat_dir: Some(flat_dir.into()),
            dated_dir: Some(dated_dir.into()),
            move_times: Vec::new(),
        }
    }

    /// Attach scheduled trigger times.
    #[must_use]
    pub fn with_move_times(mut self, move_times: Vec<NaiveTime>) -> Self {
        self.move_times = move_times;
        self
    }

    /// Validate a raw document into a record.
    ///
    /// # Errors
    ///
    /// Fails when `source_dir` is missing or blank, when an optional directory is
    /// present but blank, or when any scheduled time is malformed.
    pub fn from_document(document: ConfigDocument) -> ConfigResult<Self> {
        let ConfigDocument {
            source_dir,
            flat_dir,
            dated_dir,
            move_times,
        } = document;

        Ok(Self {
            source_dir: required_dir("source_dir", source_dir)?,
            flat_dir: optional_dir("flat_dir", flat_dir)?,
            dated_dir: optional_dir("dated_dir", dated_dir)?,
            move_times: parse_move_times(move_times.as_deref().unwrap_or_default())?,
        })
    }

    /// Render the record back into its JSON document form.
    #[must_use]
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            source_dir: Some(path_string(&self.source_dir)),
            flat_dir: self.flat_dir.as_deref().map(path_string),
            dated_dir: self.dated_dir.as_deref().map(path_string),
            move_times: if self.move_times.is_empty() {
                None
            } else {
                Some(self.move_times.iter().copied().map(format_move_time).collect())
            },
        }
    }

    /// Flat staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `flat_dir` was not configured.
    pub fn flat_dir(&self) -> ConfigResult<&Path> {
        self.flat_dir
            .as_deref()
            .ok_or(ConfigError::MissingField { field: "flat_dir" })
    }

    /// Archive directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `dated_dir` was not configured.
    pub fn dated_dir(&self) -> ConfigResult<&Path> {
        self.dated_dir
            .as_deref()
            .ok_or(ConfigError::MissingField { field: "dated_dir" })
    }

    /// Resolve `source_dir` to its canonical absolute form.
    ///
    /// Notification backends report absolute paths, and every destination is computed
    /// relative to the source root, so the root must be absolute before a pass starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the directory cannot be resolved, for example
    /// because it does not exist.
    pub fn canonicalize_source(mut self) -> ConfigResult<Self> {
        let resolved = fs::canonicalize(&self.source_dir).map_err(|source| {
            ConfigError::io("config.canonicalize_source", &self.source_dir, source)
        })?;
        self.source_dir = resolved;
        Ok(self)
    }

    /// Check the fields each trigger mode depends on.
    ///
    /// Both modes need the flat and archive directories; the schedule additionally
    /// needs at least one move time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first absent field.
    pub fn require_for(&self, mode: TriggerMode) -> ConfigResult<()> {
        self.flat_dir()?;
        self.dated_dir()?;
        if mode == TriggerMode::Schedule && self.move_times.is_empty() {
            return Err(ConfigError::MissingField {
                field: "move_times",
            });
        }
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// How relocation passes are triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Poll the wall clock against the configured move times.
    Schedule,
    /// Subscribe to filesystem notifications under the source directory.
    Watch,
}

impl TriggerMode {
    /// Pick the schedule when move times exist, otherwise the watcher.
    #[must_use]
    pub const fn infer(record: &ConfigRecord) -> Self {
        if record.move_times.is_empty() {
            Self::Watch
        } else {
            Self::Schedule
        }
    }

    /// Render the mode as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Watch => "watch",
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "schedule" => Ok(Self::Schedule),
            "watch" => Ok(Self::Watch),
            other => Err(ConfigError::InvalidField {
                field: "trigger",
                reason: "unsupported",
                value: Some(other.to_string()),
            }),
        }
    }
}
