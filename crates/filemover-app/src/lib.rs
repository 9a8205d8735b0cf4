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

//! File mover application wiring.
//!
//! Layout: `cli.rs` (command line), `bootstrap.rs` (logging, configuration, trigger selection),
//! `dispatch.rs` (trigger loop), `error.rs` (`AppError`).

/// Process bootstrap and configuration loading.
pub mod bootstrap;
/// Command-line definitions.
pub mod cli;
/// Trigger loop driving relocation passes.
pub mod dispatch;
/// Application error types.
pub mod error;

pub use bootstrap::{run_app, run_cli};
pub use cli::Cli;
pub use dispatch::Dispatcher;
pub use error::{AppError, AppResult};
