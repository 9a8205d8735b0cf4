use std::error::Error;
use std::path::Path;

use clap::Parser;
use filemover_config::{ConfigRecord, ConfigResult, TriggerMode, load, parse_move_time, save};
use filemover_fsops::{LayoutPolicy, RelocationEngine};
use filemover_telemetry::{CRITICAL_TARGET, LoggingConfig, init_logging};
use filemover_trigger::{EventWatcher, PollingClock, TriggerSource};
use tracing::{error, info};

use crate::cli::{Cli, Command, ConfigureArgs, LayoutChoice, TriggerChoice};
use crate::dispatch::Dispatcher;
use crate::error::{AppError, AppResult};

/// Everything the trigger loop needs, derived from the configuration document.
#[derive(Debug)]
pub(crate) struct RunPlan {
    record: ConfigRecord,
    mode: TriggerMode,
    layout: LayoutPolicy,
}

impl RunPlan {
    /// Load the document at `config_path`, check it supports the requested trigger and
    /// layout, and resolve the source root to an absolute path.
    pub(crate) fn prepare(
        config_path: &Path,
        trigger: TriggerChoice,
        layout: LayoutChoice,
    ) -> ConfigResult<Self> {
        let record = load(config_path)?;
        let mode = trigger.resolve(&record);
        record.require_for(mode)?;
        let record = record.canonicalize_source()?;
        let layout = match layout {
            LayoutChoice::Mirror => LayoutPolicy::mirror(
                &record.source_dir,
                record.flat_dir()?,
                record.dated_dir()?,
            ),
            LayoutChoice::Dated => LayoutPolicy::date_bucketed(record.dated_dir()?),
        };
        Ok(Self {
            record,
            mode,
            layout,
        })
    }
}

/// Entry point for the `filemover` binary.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, the watcher cannot subscribe, or
/// `configure` cannot write the document. A configuration that fails to load is logged as
/// critical and is not an error.
pub async fn run_app() -> AppResult<()> {
    run_cli(Cli::parse()).await
}

/// Execute an already parsed command line.
///
/// # Errors
///
/// See [`run_app`].
pub async fn run_cli(cli: Cli) -> AppResult<()> {
    let logging = LoggingConfig {
        level: &cli.log_level,
        log_file: &cli.log_file,
        console: cli.console,
    };
    let _log_guard =
        init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    match cli.command {
        Some(Command::Configure(args)) => configure(&cli.config, args),
        Some(Command::Run) | None => run(&cli.config, cli.trigger, cli.layout).await,
    }
}

async fn run(config_path: &Path, trigger: TriggerChoice, layout: LayoutChoice) -> AppResult<()> {
    info!(config = %config_path.display(), "file mover starting");

    let plan = match RunPlan::prepare(config_path, trigger, layout) {
        Ok(plan) => plan,
        Err(err) => {
            error!(
                target: CRITICAL_TARGET,
                config = %config_path.display(),
                "error loading configuration: {}",
                error_chain(&err)
            );
            return Ok(());
        }
    };
    info!(
        trigger = plan.mode.as_str(),
        layout = plan.layout.name(),
        source_dir = %plan.record.source_dir.display(),
        "configuration loaded"
    );

    let engine = RelocationEngine::new(&plan.record.source_dir, plan.layout);
    let mut source: Box<dyn TriggerSource> = match plan.mode {
        TriggerMode::Schedule => Box::new(PollingClock::new(plan.record.move_times.clone())),
        TriggerMode::Watch => Box::new(
            EventWatcher::subscribe(&plan.record.source_dir)
                .map_err(|err| AppError::trigger("trigger.subscribe", err))?,
        ),
    };

    Dispatcher::new(engine)
        .run(source.as_mut(), interrupt())
        .await
}

pub(crate) fn configure(config_path: &Path, args: ConfigureArgs) -> AppResult<()> {
    let ConfigureArgs {
        source,
        flat,
        dated,
        times,
    } = args;
    let move_times = times
        .iter()
        .map(|value| parse_move_time(value))
        .collect::<ConfigResult<Vec<_>>>()
        .map_err(|err| AppError::config("configure.parse_time", err))?;
    let record = ConfigRecord::new(source, flat, dated).with_move_times(move_times);
    save(config_path, &record).map_err(|err| AppError::config("configure.save", err))?;
    info!(path = %config_path.display(), "configuration saved");
    Ok(())
}

async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for interrupt; running until terminated");
        std::future::pending::<()>().await;
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use filemover_config::ConfigError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Scratch directory with an existing `in/` source root.
    fn scratch() -> anyhow::Result<(TempDir, PathBuf)> {
        let temp = TempDir::new()?;
        let source = temp.path().join("in");
        fs::create_dir_all(&source)?;
        Ok((temp, source))
    }

    fn saved(dir: &Path, record: &ConfigRecord) -> anyhow::Result<PathBuf> {
        let path = dir.join("file_mover_config.json");
        save(&path, record)?;
        Ok(path)
    }

    #[test]
    fn prepare_builds_mirror_plan_for_watcher_document() -> anyhow::Result<()> {
        let (temp, source) = scratch()?;
        let path = saved(temp.path(), &ConfigRecord::new(&source, "/flat", "/dated"))?;

        let plan = RunPlan::prepare(&path, TriggerChoice::Auto, LayoutChoice::Mirror)?;
        let root = fs::canonicalize(&source)?;
        assert_eq!(plan.mode, TriggerMode::Watch);
        assert_eq!(plan.record.source_dir, root);
        assert_eq!(plan.layout, LayoutPolicy::mirror(&root, "/flat", "/dated"));
        Ok(())
    }

    #[test]
    fn prepare_resolves_a_source_root_given_with_dot_segments() -> anyhow::Result<()> {
        let (temp, source) = scratch()?;
        let dotted = source.join("..").join("in");
        let path = saved(temp.path(), &ConfigRecord::new(dotted, "/flat", "/dated"))?;

        let plan = RunPlan::prepare(&path, TriggerChoice::Watch, LayoutChoice::Mirror)?;
        assert!(plan.record.source_dir.is_absolute());
        assert_eq!(plan.record.source_dir, fs::canonicalize(&source)?);
        Ok(())
    }

    #[test]
    fn prepare_rejects_missing_source_root() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let absent = temp.path().join("absent");
        let path = saved(temp.path(), &ConfigRecord::new(absent, "/flat", "/dated"))?;

        let err = RunPlan::prepare(&path, TriggerChoice::Watch, LayoutChoice::Mirror)
            .expect_err("source root must exist");
        assert!(matches!(
            err,
            ConfigError::Io {
                operation: "config.canonicalize_source",
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn prepare_builds_dated_schedule_plan() -> anyhow::Result<()> {
        let (temp, source) = scratch()?;
        let record = ConfigRecord::new(&source, "/flat", "/dated")
            .with_move_times(vec![parse_move_time("11:00 AM")?]);
        let path = saved(temp.path(), &record)?;

        let plan = RunPlan::prepare(&path, TriggerChoice::Auto, LayoutChoice::Dated)?;
        assert_eq!(plan.mode, TriggerMode::Schedule);
        assert_eq!(plan.layout, LayoutPolicy::date_bucketed("/dated"));
        assert_eq!(plan.record.move_times.len(), 1);
        Ok(())
    }

    #[test]
    fn prepare_rejects_forced_schedule_without_times() -> anyhow::Result<()> {
        let (temp, source) = scratch()?;
        let path = saved(temp.path(), &ConfigRecord::new(&source, "/flat", "/dated"))?;

        let err = RunPlan::prepare(&path, TriggerChoice::Schedule, LayoutChoice::Mirror)
            .expect_err("schedule needs move times");
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "move_times"
            }
        ));
        Ok(())
    }

    #[test]
    fn prepare_reports_missing_document() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let err = RunPlan::prepare(
            &temp.path().join("absent.json"),
            TriggerChoice::Auto,
            LayoutChoice::Mirror,
        )
        .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(error_chain(&err).contains(": "), "cause is appended");
        Ok(())
    }

    #[test]
    fn configure_writes_a_loadable_document() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("conf").join("file_mover_config.json");
        configure(
            &path,
            ConfigureArgs {
                source: PathBuf::from("/in"),
                flat: PathBuf::from("/flat"),
                dated: PathBuf::from("/dated"),
                times: vec!["4:30 PM".to_string(), "11:00 am".to_string()],
            },
        )?;

        let record = load(&path)?;
        assert_eq!(record.source_dir, PathBuf::from("/in"));
        assert_eq!(
            record.move_times,
            vec![parse_move_time("4:30 PM")?, parse_move_time("11:00 AM")?]
        );
        Ok(())
    }

    #[test]
    fn configure_rejects_malformed_time_without_writing() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("file_mover_config.json");
        let result = configure(
            &path,
            ConfigureArgs {
                source: PathBuf::from("/in"),
                flat: PathBuf::from("/flat"),
                dated: PathBuf::from("/dated"),
                times: vec!["25:00 PM".to_string()],
            },
        );
        assert!(matches!(
            result,
            Err(AppError::Config {
                operation: "configure.parse_time",
                ..
            })
        ));
        assert!(!path.exists());
        Ok(())
    }
}
