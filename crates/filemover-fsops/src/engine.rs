//! Relocation engine: walks a root and applies the layout to every regular file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::guard::PassGuard;
use crate::layout::{Finish, LayoutPolicy, TransferPlan};
use crate::model::{FileFailure, FileOutcome, FileRecord, RelocationSummary, TransferStep};

type StepResult<T> = Result<T, (TransferStep, FsOpsError)>;

/// Moves files out of one source tree according to a [`LayoutPolicy`].
///
/// Every pass the engine runs, whether over the root, a sub-directory or a single file,
/// holds the same pass lock. Cloning is cheap; clones share that lock.
#[derive(Clone)]
pub struct RelocationEngine {
    source_root: Arc<PathBuf>,
    layout: Arc<LayoutPolicy>,
    guard: PassGuard,
}

impl RelocationEngine {
    /// Construct an engine relocating files under `source_root` with the given layout.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, layout: LayoutPolicy) -> Self {
        let source_root = source_root.into();
        info!(
            source_root = %source_root.display(),
            layout = layout.name(),
            ?layout,
            "relocation handler initialised"
        );
        Self {
            source_root: Arc::new(source_root),
            layout: Arc::new(layout),
            guard: PassGuard::default(),
        }
    }

    /// Source root whose passes this engine serialises.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Layout applied by this engine.
    #[must_use]
    pub fn layout(&self) -> &LayoutPolicy {
        &self.layout
    }

    /// Relocate every regular file under `root`, usually the source root or a directory
    /// inside it.
    ///
    /// A failing file is logged and left in place; the walk continues with the next file.
    /// Blocks while another pass of this engine is running.
    pub fn relocate(&self, root: &Path) -> RelocationSummary {
        self.exclusive(|| self.walk(root))
    }

    /// Relocate a single file immediately, bypassing the directory walk.
    ///
    /// Blocks while another pass of this engine is running.
    pub fn relocate_file(&self, path: &Path) -> RelocationSummary {
        self.exclusive(|| {
            let mut summary = RelocationSummary::new(path);
            summary.discovered = 1;
            self.relocate_one(path.to_path_buf(), &mut summary);
            summary
        })
    }

    fn exclusive<T>(&self, pass: impl FnOnce() -> T) -> T {
        let held = self.guard.enter();
        let outcome = pass();
        drop(held);
        outcome
    }

    fn walk(&self, root: &Path) -> RelocationSummary {
        info!(root = %root.display(), layout = self.layout.name(), "processing directory");
        let mut summary = RelocationSummary::new(root);

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = FsOpsError::walkdir("relocate.walk", root, source);
                    if err.is_not_found() {
                        debug!(root = %root.display(), error = %err, "walk entry vanished");
                    } else {
                        summary.walk_errors += 1;
                        error!(root = %root.display(), error = ?err, "failed to read directory entry");
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            summary.discovered += 1;
            let path = entry.into_path();
            debug!(path = %path.display(), "discovered file");
            self.relocate_one(path, &mut summary);
        }

        info!(
            root = %root.display(),
            discovered = summary.discovered,
            relocated = summary.relocated,
            failed = summary.failed(),
            vanished = summary.vanished,
            "finished processing directory"
        );
        summary
    }

    fn relocate_one(&self, path: PathBuf, summary: &mut RelocationSummary) {
        match self.process_file(&path) {
            Ok(outcome) => {
                if outcome == FileOutcome::Vanished {
                    debug!(path = %path.display(), "file vanished before relocation");
                }
                summary.record(outcome);
            }
            Err((step, error)) => {
                error!(
                    path = %path.display(),
                    step = step.as_str(),
                    error = ?error,
                    "error processing file {}: {}",
                    path.display(),
                    error_chain(&error)
                );
                summary.failures.push(FileFailure { path, step, error });
            }
        }
    }

    fn process_file(&self, path: &Path) -> StepResult<FileOutcome> {
        let modified = match modification_time(path) {
            Ok(modified) => modified,
            Err(err) if err.is_not_found() => return Ok(FileOutcome::Vanished),
            Err(err) => return Err((TransferStep::Inspect, err)),
        };
        let record = FileRecord::new(&self.source_root, path.to_path_buf(), modified);
        let plan = self
            .layout
            .resolve(&record.path, record.modified)
            .map_err(|err| (TransferStep::Resolve, err))?;
        execute_plan(&record, &plan)
    }
}

fn execute_plan(record: &FileRecord, plan: &TransferPlan) -> StepResult<FileOutcome> {
    let source = record.path.as_path();

    for destination in &plan.copies {
        prepare_parent(destination)?;
        if let Err(err) = fs::copy(source, destination) {
            if err.kind() == io::ErrorKind::NotFound && !source.exists() {
                return Ok(FileOutcome::Vanished);
            }
            return Err((
                TransferStep::Copy,
                FsOpsError::io("relocate.copy", destination, err),
            ));
        }
        info!(
            source = %source.display(),
            destination = %destination.display(),
            "copied file"
        );
    }

    match &plan.finish {
        Finish::RemoveSource => match fs::remove_file(source) {
            Ok(()) => info!(path = %source.display(), "deleted original file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %source.display(), "original already removed by another pass");
            }
            Err(err) => {
                return Err((
                    TransferStep::RemoveSource,
                    FsOpsError::io("relocate.remove_source", source, err),
                ));
            }
        },
        Finish::MoveTo(destination) => {
            prepare_parent(destination)?;
            if let Err(err) = move_file(source, destination) {
                if err.is_not_found() && !source.exists() {
                    return Ok(FileOutcome::Vanished);
                }
                return Err((TransferStep::Move, err));
            }
            info!(
                source = %source.display(),
                destination = %destination.display(),
                "moved file"
            );
        }
    }

    Ok(FileOutcome::Relocated)
}

fn prepare_parent(destination: &Path) -> StepResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| {
            (
                TransferStep::PrepareParent,
                FsOpsError::io("relocate.create_parent", parent, source),
            )
        })?;
    }
    Ok(())
}

fn move_file(source: &Path, destination: &Path) -> FsOpsResult<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if rename_err.kind() == io::ErrorKind::NotFound {
                return Err(FsOpsError::io("move_file.rename", source, rename_err));
            }
            warn!(
                source = %source.display(),
                destination = %destination.display(),
                error = %rename_err,
                "rename failed; falling back to copy and remove"
            );
            fs::copy(source, destination)
                .map_err(|err| FsOpsError::io("move_file.copy", destination, err))?;
            match fs::remove_file(source) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => {
                    Err(FsOpsError::io("move_file.cleanup", source, err))
                }
                _ => Ok(()),
            }
        }
    }
}

fn modification_time(path: &Path) -> FsOpsResult<DateTime<Local>> {
    let metadata =
        fs::metadata(path).map_err(|source| FsOpsError::io("relocate.metadata", path, source))?;
    let modified = metadata
        .modified()
        .map_err(|source| FsOpsError::io("relocate.modified", path, source))?;
    Ok(DateTime::<Local>::from(modified))
}

fn error_chain(error: &FsOpsError) -> String {
    let mut rendered = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
