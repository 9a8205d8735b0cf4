//! Filesystem-event trigger backed by `notify`.
//!
//! # Design
//! - One recursive subscription on the source root, using the platform's recommended backend.
//! - The backend callback only forwards raw events into a channel; classification happens on
//!   the consumer side so a slow stat never blocks the backend thread.
//! - Only create and modify notifications produce triggers. There is no debounce, so a burst of
//!   notifications yields a burst of triggers.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::error::{TriggerError, TriggerResult};
use crate::event::{ChangeKind, ChangeTarget, TriggerEvent};
use crate::source::TriggerSource;

/// Trigger source fed by filesystem notifications under one root.
pub struct EventWatcher {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    events: UnboundedReceiverStream<notify::Result<Event>>,
    pending: VecDeque<TriggerEvent>,
}

impl EventWatcher {
    /// Subscribe recursively to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::Subscribe`] when the backend cannot be created or the root
    /// cannot be watched.
    pub fn subscribe(root: impl Into<PathBuf>) -> TriggerResult<Self> {
        let root = root.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            if tx.send(result).is_err() {
                debug!("watcher channel closed; dropping notification");
            }
        })
        .map_err(|source| TriggerError::subscribe(&root, source))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| TriggerError::subscribe(&root, source))?;
        info!(root = %root.display(), "watching directory for changes");

        Ok(Self {
            root,
            watcher: Some(watcher),
            events: UnboundedReceiverStream::new(rx),
            pending: VecDeque::new(),
        })
    }

    /// Root directory being watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn enqueue(&mut self, event: Event) {
        let Some(change_kind) = change_kind(&event.kind) else {
            return;
        };
        for path in event.paths {
            if let Some(target) = classify(&path) {
                debug!(
                    path = %path.display(),
                    kind = change_kind.as_str(),
                    target = target.as_str(),
                    "filesystem change observed"
                );
                self.pending.push_back(TriggerEvent::FilesystemChange {
                    path,
                    change_kind,
                    target,
                });
            }
        }
    }
}

#[async_trait]
impl TriggerSource for EventWatcher {
    fn name(&self) -> &'static str {
        "watch"
    }

    async fn next_trigger(&mut self) -> Option<TriggerEvent> {
        loop {
            if self.watcher.is_none() {
                return None;
            }
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.events.next().await? {
                Ok(event) => self.enqueue(event),
                Err(err) => warn!(
                    root = %self.root.display(),
                    error = %err,
                    "watcher backend reported an error"
                ),
            }
        }
    }

    fn shutdown(&mut self) -> TriggerResult<()> {
        self.pending.clear();
        if let Some(mut watcher) = self.watcher.take() {
            watcher
                .unwatch(&self.root)
                .map_err(|source| TriggerError::unsubscribe(&self.root, source))?;
            info!(root = %self.root.display(), "stopped watching directory");
        }
        Ok(())
    }
}

const fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        _ => None,
    }
}

/// Decide whether `path` is a directory or a file. Paths that no longer exist are dropped.
fn classify(path: &Path) -> Option<ChangeTarget> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Some(ChangeTarget::Directory),
        Ok(metadata) if metadata.is_file() => Some(ChangeTarget::File),
        Ok(_) => None,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "changed path vanished before it could be classified");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to classify changed path");
            None
        }
    }
}
