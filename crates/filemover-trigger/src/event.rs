//! Events emitted by trigger sources.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

/// Kind of filesystem notification that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A path was created.
    Created,
    /// A path's contents or metadata changed.
    Modified,
}

impl ChangeKind {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

/// What the changed path turned out to be when it was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTarget {
    /// A directory; its whole subtree should be processed.
    Directory,
    /// A regular file.
    File,
}

impl ChangeTarget {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

/// Signal that a relocation pass should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A configured time of day came due.
    Scheduled {
        /// Today's date combined with the configured time.
        fired_at: NaiveDateTime,
    },
    /// A path under the watched root was created or modified.
    FilesystemChange {
        /// Changed path.
        path: PathBuf,
        /// Notification kind.
        change_kind: ChangeKind,
        /// Whether the path is a directory or a file.
        target: ChangeTarget,
    },
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled { fired_at } => write!(f, "scheduled run at {fired_at}"),
            Self::FilesystemChange {
                path,
                change_kind,
                target,
            } => write!(
                f,
                "{} {} {}",
                target.as_str(),
                change_kind.as_str(),
                path.display()
            ),
        }
    }
}
