//! Reading and writing the JSON configuration document.
//!
//! # Design
//! - The daemon reads the document once at startup; only `filemover configure` writes it.
//! - Writing refuses incomplete records so a saved file always satisfies both trigger modes'
//!   directory requirements.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, ConfigRecord};

/// Configuration file name looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "file_mover_config.json";

/// Load and validate the configuration document at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, is not valid JSON, lacks
/// `source_dir`, or contains a malformed scheduled time.
pub fn load(path: &Path) -> ConfigResult<ConfigRecord> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::io("config.read", path, source))?;
    let document: ConfigDocument =
        serde_json::from_str(&raw).map_err(|source| ConfigError::json("config.parse", path, source))?;
    let record = ConfigRecord::from_document(document)?;
    debug!(
        path = %path.display(),
        move_times = record.move_times.len(),
        "configuration document loaded"
    );
    Ok(record)
}

/// Persist `record` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when the flat or archive directory is unset,
/// or an IO/serialisation error when the document cannot be written.
pub fn save(path: &Path, record: &ConfigRecord) -> ConfigResult<()> {
    record.flat_dir()?;
    record.dated_dir()?;

    let serialised = serde_json::to_string_pretty(&record.to_document())
        .map_err(|source| ConfigError::json("config.serialise", path, source))?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| ConfigError::io("config.create_parent", parent, source))?;
    }
    fs::write(path, serialised).map_err(|source| ConfigError::io("config.write", path, source))
}
