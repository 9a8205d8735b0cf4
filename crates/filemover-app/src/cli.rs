//! Command-line surface of the `filemover` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use filemover_config::{ConfigRecord, DEFAULT_CONFIG_FILE, TriggerMode};
use filemover_telemetry::{DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL};

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "filemover",
    about = "Moves files out of a source directory on a schedule or as they arrive"
)]
pub struct Cli {
    /// Configuration document to read or write.
    #[arg(
        long,
        global = true,
        env = "FILEMOVER_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,
    /// File that receives log lines.
    #[arg(
        long,
        global = true,
        env = "FILEMOVER_LOG_FILE",
        default_value = DEFAULT_LOG_FILE
    )]
    pub log_file: PathBuf,
    /// Log level; `RUST_LOG` takes precedence when set.
    #[arg(
        long,
        global = true,
        env = "FILEMOVER_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    pub log_level: String,
    /// Mirror log lines to stderr.
    #[arg(long, global = true, env = "FILEMOVER_CONSOLE")]
    pub console: bool,
    /// How relocation passes are triggered.
    #[arg(
        long,
        global = true,
        env = "FILEMOVER_TRIGGER",
        value_enum,
        default_value_t = TriggerChoice::Auto
    )]
    pub trigger: TriggerChoice,
    /// Where relocated files are written.
    #[arg(
        long,
        global = true,
        env = "FILEMOVER_LAYOUT",
        value_enum,
        default_value_t = LayoutChoice::Mirror
    )]
    pub layout: LayoutChoice,
    /// Subcommand; `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; running the daemon is the default.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the configuration and relocate files until interrupted.
    Run,
    /// Write a configuration document.
    Configure(ConfigureArgs),
}

/// Values written by `filemover configure`.
#[derive(Debug, Args)]
pub struct ConfigureArgs {
    /// Directory incoming files appear in.
    #[arg(long)]
    pub source: PathBuf,
    /// Flat staging directory.
    #[arg(long)]
    pub flat: PathBuf,
    /// Archive directory.
    #[arg(long)]
    pub dated: PathBuf,
    /// Scheduled move time such as `11:00 AM`; repeat for several.
    #[arg(long = "time")]
    pub times: Vec<String>,
}

/// Trigger strategy selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TriggerChoice {
    /// Schedule when move times are configured, otherwise watch.
    #[default]
    Auto,
    /// Poll the clock against the configured move times.
    Schedule,
    /// React to filesystem notifications.
    Watch,
}

impl TriggerChoice {
    /// Concrete trigger mode for a loaded record.
    #[must_use]
    pub const fn resolve(self, record: &ConfigRecord) -> TriggerMode {
        match self {
            Self::Auto => TriggerMode::infer(record),
            Self::Schedule => TriggerMode::Schedule,
            Self::Watch => TriggerMode::Watch,
        }
    }
}

/// Destination layout selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LayoutChoice {
    /// Flat copy by basename plus a structure-preserving archive copy.
    #[default]
    Mirror,
    /// Archive into `YYYY/MM_YYYY/DD_MM` buckets by modification date.
    Dated,
}
