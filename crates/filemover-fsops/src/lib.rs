//! Relocation engine: walks a source tree and moves every regular file according to a layout.
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

pub mod engine;
pub mod error;
mod guard;
pub mod layout;
pub mod model;

pub use engine::RelocationEngine;
pub use error::{FsOpsError, FsOpsResult};
pub use layout::{Finish, LayoutPolicy, TransferPlan, date_bucket};
pub use model::{FileFailure, FileOutcome, FileRecord, RelocationSummary, TransferStep};
