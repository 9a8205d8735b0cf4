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

//! JSON-file configuration for the file mover daemon.
//!
//! Layout: `model.rs` (document and validated record), `validate.rs` (time and path
//! parsing), `loader.rs` (read/write of the document), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{DEFAULT_CONFIG_FILE, load, save};
pub use model::{ConfigDocument, ConfigRecord, TriggerMode};
pub use validate::{MOVE_TIME_FORMAT, format_move_time, parse_move_time};
