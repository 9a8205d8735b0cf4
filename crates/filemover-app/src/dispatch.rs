//! Trigger loop: turns trigger events into relocation passes.
//!
//! # Design
//! - Scheduled passes run to completion before the next trigger is read, so a long pass delays
//!   later schedule checks.
//! - Watcher passes run on blocking workers tracked in a `JoinSet`; the engine's pass lock
//!   serialises every pass under the source root, whichever path triggered it.
//! - On shutdown the source unsubscribes first, then outstanding passes are awaited. Nothing is
//!   rolled back.

use std::future::Future;
use std::path::{Path, PathBuf};

use filemover_fsops::{RelocationEngine, RelocationSummary};
use filemover_trigger::{ChangeTarget, TriggerEvent, TriggerSource};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};

/// Runs relocation passes in response to trigger events.
pub struct Dispatcher {
    engine: RelocationEngine,
    passes: JoinSet<RelocationSummary>,
}

impl Dispatcher {
    /// Dispatcher relocating files under the engine's source root.
    #[must_use]
    pub fn new(engine: RelocationEngine) -> Self {
        Self {
            engine,
            passes: JoinSet::new(),
        }
    }

    /// Drive `source` until it ends or `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error when the trigger source cannot release its subscription.
    pub async fn run<F>(mut self, source: &mut dyn TriggerSource, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            trigger = source.name(),
            source_dir = %self.engine.source_root().display(),
            "dispatcher started"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("interrupt received; stopping trigger loop");
                    break;
                }
                Some(joined) = self.passes.join_next(), if !self.passes.is_empty() => {
                    report(joined);
                }
                next = source.next_trigger() => match next {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        debug!(trigger = source.name(), "trigger source ended");
                        break;
                    }
                },
            }
        }

        let unsubscribed = source
            .shutdown()
            .map_err(|err| AppError::trigger("dispatcher.shutdown", err));

        let outstanding = self.passes.len();
        if outstanding > 0 {
            info!(outstanding, "waiting for in-flight relocation passes");
        }
        while let Some(joined) = self.passes.join_next().await {
            report(joined);
        }
        info!("dispatcher stopped");
        unsubscribed
    }

    async fn dispatch(&mut self, event: TriggerEvent) {
        info!(%event, "trigger fired");
        match event {
            TriggerEvent::Scheduled { .. } => {
                let engine = self.engine.clone();
                report(
                    task::spawn_blocking(move || engine.relocate(engine.source_root())).await,
                );
            }
            TriggerEvent::FilesystemChange {
                path,
                target: ChangeTarget::Directory,
                ..
            } => self.spawn_pass(path, |engine, path| engine.relocate(path)),
            TriggerEvent::FilesystemChange {
                path,
                target: ChangeTarget::File,
                ..
            } => {
                if self.engine.layout().relocates_single_files() {
                    self.spawn_pass(path, |engine, path| engine.relocate_file(path));
                } else {
                    debug!(path = %path.display(), "file change noted; awaiting directory pass");
                }
            }
        }
    }

    fn spawn_pass(
        &mut self,
        path: PathBuf,
        pass: fn(&RelocationEngine, &Path) -> RelocationSummary,
    ) {
        let engine = self.engine.clone();
        self.passes.spawn_blocking(move || pass(&engine, &path));
    }
}

fn report(joined: Result<RelocationSummary, JoinError>) {
    match joined {
        Ok(summary) if summary.is_clean() => debug!(
            root = %summary.root.display(),
            relocated = summary.relocated,
            "relocation pass complete"
        ),
        Ok(summary) => warn!(
            root = %summary.root.display(),
            relocated = summary.relocated,
            failed = summary.failed(),
            walk_errors = summary.walk_errors,
            "relocation pass left files behind"
        ),
        Err(err) => error!(error = %err, "relocation pass aborted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use filemover_fsops::LayoutPolicy;
    use filemover_trigger::{ChangeKind, TriggerResult};
    use tempfile::TempDir;

    /// Source that replays scripted events and then either ends or stalls.
    struct Scripted {
        events: VecDeque<TriggerEvent>,
        stall_when_empty: bool,
        shut_down: Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(events: Vec<TriggerEvent>, stall_when_empty: bool) -> Self {
            Self {
                events: events.into(),
                stall_when_empty,
                shut_down: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl TriggerSource for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn next_trigger(&mut self) -> Option<TriggerEvent> {
            match self.events.pop_front() {
                Some(event) => Some(event),
                None if self.stall_when_empty => std::future::pending().await,
                None => None,
            }
        }

        fn shutdown(&mut self) -> TriggerResult<()> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Dirs {
        _temp: TempDir,
        source: PathBuf,
        flat: PathBuf,
        archive: PathBuf,
    }

    impl Dirs {
        fn mirror(&self) -> RelocationEngine {
            RelocationEngine::new(
                &self.source,
                LayoutPolicy::mirror(&self.source, &self.flat, &self.archive),
            )
        }

        fn dated(&self) -> RelocationEngine {
            RelocationEngine::new(&self.source, LayoutPolicy::date_bucketed(&self.archive))
        }
    }

    fn dirs() -> anyhow::Result<Dirs> {
        let temp = TempDir::new()?;
        let source = temp.path().join("in");
        let flat = temp.path().join("flat");
        let archive = temp.path().join("archive");
        fs::create_dir_all(&source)?;
        Ok(Dirs {
            _temp: temp,
            source,
            flat,
            archive,
        })
    }

    fn scheduled() -> TriggerEvent {
        let fired_at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|date| date.and_hms_opt(11, 0, 0))
            .expect("valid instant");
        TriggerEvent::Scheduled { fired_at }
    }

    fn change(path: PathBuf, target: ChangeTarget) -> TriggerEvent {
        TriggerEvent::FilesystemChange {
            path,
            change_kind: ChangeKind::Created,
            target,
        }
    }

    #[tokio::test]
    async fn scheduled_trigger_relocates_the_source_root() -> anyhow::Result<()> {
        let dirs = dirs()?;
        fs::create_dir_all(dirs.source.join("a"))?;
        fs::write(dirs.source.join("a/report.txt"), "r")?;
        let engine = dirs.mirror();

        let mut source = Scripted::new(vec![scheduled()], false);
        let shut_down = Arc::clone(&source.shut_down);
        Dispatcher::new(engine)
            .run(&mut source, std::future::pending())
            .await?;

        assert!(dirs.flat.join("report.txt").exists());
        assert!(dirs.archive.join("a/report.txt").exists());
        assert!(!dirs.source.join("a/report.txt").exists());
        assert!(shut_down.load(Ordering::SeqCst));
        Ok(())
    }

    #[tokio::test]
    async fn directory_change_passes_are_awaited_before_returning() -> anyhow::Result<()> {
        let dirs = dirs()?;
        let batch = dirs.source.join("batch");
        fs::create_dir_all(&batch)?;
        for idx in 0..5 {
            fs::write(batch.join(format!("{idx}.txt")), "x")?;
        }
        let engine = dirs.mirror();

        let events = vec![
            change(batch.clone(), ChangeTarget::Directory),
            change(batch.clone(), ChangeTarget::Directory),
        ];
        let mut source = Scripted::new(events, false);
        Dispatcher::new(engine)
            .run(&mut source, std::future::pending())
            .await?;

        assert_eq!(fs::read_dir(&batch)?.count(), 0);
        assert_eq!(fs::read_dir(dirs.archive.join("batch"))?.count(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn file_change_is_only_logged_for_mirror_layout() -> anyhow::Result<()> {
        let dirs = dirs()?;
        let file = dirs.source.join("loose.txt");
        fs::write(&file, "x")?;
        let engine = dirs.mirror();

        let mut source = Scripted::new(vec![change(file.clone(), ChangeTarget::File)], false);
        Dispatcher::new(engine)
            .run(&mut source, std::future::pending())
            .await?;

        assert!(file.exists());
        assert!(!dirs.flat.exists());
        Ok(())
    }

    #[tokio::test]
    async fn file_change_relocates_single_file_for_dated_layout() -> anyhow::Result<()> {
        let dirs = dirs()?;
        let file = dirs.source.join("photo.jpg");
        fs::write(&file, "x")?;
        let engine = dirs.dated();

        let mut source = Scripted::new(vec![change(file.clone(), ChangeTarget::File)], false);
        Dispatcher::new(engine)
            .run(&mut source, std::future::pending())
            .await?;

        assert!(!file.exists());
        let buckets = walk_files(&dirs.archive);
        assert_eq!(buckets.len(), 1);
        assert!(buckets[0].ends_with("photo.jpg"));
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_signal_stops_a_stalled_source() -> anyhow::Result<()> {
        let dirs = dirs()?;
        let engine = dirs.dated();
        let mut source = Scripted::new(Vec::new(), true);
        let shut_down = Arc::clone(&source.shut_down);

        Dispatcher::new(engine)
            .run(&mut source, async {})
            .await?;

        assert!(shut_down.load(Ordering::SeqCst));
        Ok(())
    }

    fn walk_files(root: &Path) -> Vec<PathBuf> {
        walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}
