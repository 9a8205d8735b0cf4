//! Domain models for relocation passes.
//!
//! # Design
//! - File records are transient: built during one walk, consumed immediately, never cached.
//! - Summaries carry per-file failures so callers decide how to report them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::FsOpsError;

/// A regular file discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute (or caller-rooted) path of the file.
    pub path: PathBuf,
    /// Path relative to the root of the pass that discovered it.
    pub relative_path: PathBuf,
    /// Last modification time in the local calendar.
    pub modified: DateTime<Local>,
}

impl FileRecord {
    /// Build a record for a file discovered under `root`.
    #[must_use]
    pub fn new(root: &Path, path: PathBuf, modified: DateTime<Local>) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.clone(), Path::to_path_buf);
        Self {
            path,
            relative_path,
            modified,
        }
    }
}

/// Individual operation applied to a file during relocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferStep {
    /// Read the file's metadata before resolving destinations.
    Inspect,
    /// Compute destination paths.
    Resolve,
    /// Create a destination's parent directory.
    PrepareParent,
    /// Copy bytes to a destination.
    Copy,
    /// Remove the source after every copy succeeded.
    RemoveSource,
    /// Move the source to its sole destination.
    Move,
}

impl TransferStep {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::Resolve => "resolve",
            Self::PrepareParent => "prepare_parent",
            Self::Copy => "copy",
            Self::RemoveSource => "remove_source",
            Self::Move => "move",
        }
    }
}

/// A file whose relocation stopped part-way.
#[derive(Debug)]
pub struct FileFailure {
    /// Source path that remains in place.
    pub path: PathBuf,
    /// Step that failed; later steps for this file were skipped.
    pub step: TransferStep,
    /// Underlying cause.
    pub error: FsOpsError,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Every destination was written and the source is gone.
    Relocated,
    /// The file disappeared before it could be processed (another pass took it).
    Vanished,
}

/// Outcome of one relocation pass.
#[derive(Debug, Default)]
pub struct RelocationSummary {
    /// Root directory (or single file) the pass processed.
    pub root: PathBuf,
    /// Regular files encountered.
    pub discovered: usize,
    /// Files fully relocated.
    pub relocated: usize,
    /// Files that disappeared before or during processing.
    pub vanished: usize,
    /// Directory entries the walk could not read.
    pub walk_errors: usize,
    /// Files left in place because a step failed.
    pub failures: Vec<FileFailure>,
}

impl RelocationSummary {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Relocated => self.relocated += 1,
            FileOutcome::Vanished => self.vanished += 1,
        }
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether the pass finished without per-file or walk errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.walk_errors == 0
    }
}
