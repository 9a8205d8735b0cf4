//! Mutual exclusion for relocation passes under one source root.
//!
//! A directory pass, a sub-directory pass and a single-file pass under the same root all
//! race to delete the same files, so they share one lock. Engines built for different
//! roots hold different locks and run concurrently.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

/// Pass lock shared by every clone of one engine.
#[derive(Clone, Default)]
pub(crate) struct PassGuard {
    lock: Arc<Mutex<()>>,
}

impl PassGuard {
    /// Block until no other pass under this root is running.
    pub(crate) fn enter(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("relocation pass lock poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
