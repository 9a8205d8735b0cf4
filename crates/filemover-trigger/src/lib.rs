//! Trigger sources that decide when a relocation pass runs.
//!
//! Two strategies share the [`TriggerSource`] interface: [`PollingClock`] fires at configured
//! times of day, [`EventWatcher`] fires on filesystem notifications under the source root.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod error;
pub mod event;
pub mod polling;
pub mod schedule;
pub mod source;
pub mod watcher;

pub use clock::{Clock, SystemClock};
pub use error::{TriggerError, TriggerResult};
pub use event::{ChangeKind, ChangeTarget, TriggerEvent};
pub use polling::{POLL_INTERVAL, PollingClock};
pub use schedule::{FIRE_TOLERANCE, PollSchedule};
pub use source::TriggerSource;
pub use watcher::EventWatcher;
