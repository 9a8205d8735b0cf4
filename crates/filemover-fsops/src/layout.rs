//! Destination path resolution.
//!
//! # Design
//! - Layouts are a closed set of variants; the engine only sees the resulting [`TransferPlan`].
//! - Resolution is pure: no filesystem access, the caller supplies the modification time.
//! - Flat destinations keep the basename only, so same-named files collide and the last
//!   write wins.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local};

use crate::error::{FsOpsError, FsOpsResult};

/// Where each relocated file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Copy to the flat directory by basename and to the archive mirroring the source tree,
    /// then delete the source.
    Mirror {
        /// Source root the archive structure is measured from.
        source_root: PathBuf,
        /// Flat staging directory.
        flat_dir: PathBuf,
        /// Structure-preserving archive directory.
        archive_dir: PathBuf,
    },
    /// Move into `archive_dir/YYYY/MM_YYYY/DD_MM/` by modification date.
    DateBucketed {
        /// Root of the dated archive.
        archive_dir: PathBuf,
    },
}

/// How the source is disposed of once the copies are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// Delete the source file.
    RemoveSource,
    /// Move the source file to this destination.
    MoveTo(PathBuf),
}

/// Destinations computed for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Copies written in order before `finish` runs.
    pub copies: Vec<PathBuf>,
    /// Final disposal of the source.
    pub finish: Finish,
}

impl LayoutPolicy {
    /// Flat + structure-preserving archive layout.
    #[must_use]
    pub fn mirror(
        source_root: impl Into<PathBuf>,
        flat_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::Mirror {
            source_root: source_root.into(),
            flat_dir: flat_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    /// Date-bucketed single-destination layout.
    #[must_use]
    pub fn date_bucketed(archive_dir: impl Into<PathBuf>) -> Self {
        Self::DateBucketed {
            archive_dir: archive_dir.into(),
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mirror { .. } => "mirror",
            Self::DateBucketed { .. } => "dated",
        }
    }

    /// Whether a single-file notification should relocate that file directly.
    #[must_use]
    pub const fn relocates_single_files(&self) -> bool {
        matches!(self, Self::DateBucketed { .. })
    }

    /// Compute the destinations for `file`, last modified at `modified`.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] when the path has no file name, or when the
    /// mirror layout is asked for a file outside its source root.
    pub fn resolve(&self, file: &Path, modified: DateTime<Local>) -> FsOpsResult<TransferPlan> {
        let basename = file.file_name().ok_or_else(|| FsOpsError::InvalidInput {
            field: "path",
            reason: "no_file_name",
            value: Some(file.to_string_lossy().into_owned()),
        })?;

        match self {
            Self::Mirror {
                source_root,
                flat_dir,
                archive_dir,
            } => {
                let relative =
                    file.strip_prefix(source_root)
                        .map_err(|_| FsOpsError::InvalidInput {
                            field: "path",
                            reason: "outside_source_root",
                            value: Some(file.to_string_lossy().into_owned()),
                        })?;
                Ok(TransferPlan {
                    copies: vec![flat_dir.join(basename), archive_dir.join(relative)],
                    finish: Finish::RemoveSource,
                })
            }
            Self::DateBucketed { archive_dir } => Ok(TransferPlan {
                copies: Vec::new(),
                finish: Finish::MoveTo(archive_dir.join(date_bucket(modified)).join(basename)),
            }),
        }
    }
}

/// Relative bucket directory for a modification time: `YYYY/MM_YYYY/DD_MM`.
#[must_use]
pub fn date_bucket(modified: DateTime<Local>) -> PathBuf {
    let year = modified.year();
    let month = modified.month();
    let day = modified.day();
    [
        format!("{year:04}"),
        format!("{month:02}_{year:04}"),
        format!("{day:02}_{month:02}"),
    ]
    .iter()
    .collect()
}
