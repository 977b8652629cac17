use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use debup_core::{LogLevel, LogSink, RunLogger};
use debup_host::{
    check_privileges, CommandExecutor, Environment, HostEnvironment, SystemCommandExecutor,
};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod orchestrator;
mod runner;

use config::{load_settings, Cli, RunConfiguration};
use error::UpdateError;
use orchestrator::UpdateOrchestrator;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env = HostEnvironment::new();
    let executor = SystemCommandExecutor::noninteractive();

    match run_cli(&cli, &env, &executor) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(err.exit_code()),
    }
}

/// Gates on privileges, opens the run log and hands over to the orchestrator.
///
/// Failures before the run log exists are printed to stderr; later failures
/// are already in the log when this returns.
fn run_cli(
    cli: &Cli,
    env: &dyn Environment,
    executor: &dyn CommandExecutor,
) -> Result<(), UpdateError> {
    if !check_privileges(env) {
        let err = UpdateError::Privilege;
        eprintln!("{err}");
        return Err(err);
    }

    let (config, logger) = match prepare_run(cli) {
        Ok(prepared) => prepared,
        Err(err) => {
            let err = UpdateError::Unexpected(err);
            eprintln!("{err}");
            return Err(err);
        }
    };
    tracing::debug!(log_file = %logger.path().display(), "opened run log");

    let orchestrator = UpdateOrchestrator::new(&config, env, executor, &logger);
    match panic::catch_unwind(AssertUnwindSafe(|| orchestrator.run())) {
        Ok(result) => result,
        Err(payload) => {
            let err = UpdateError::Unexpected(anyhow!("panicked: {}", panic_message(&*payload)));
            logger.error(&format!("System update aborted: {err}"));
            Err(err)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

fn prepare_run(cli: &Cli) -> Result<(RunConfiguration, RunLogger)> {
    let settings = load_settings(cli.config.as_deref())?;
    let config = RunConfiguration::resolve(cli, settings)?;
    let min_level = if config.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let logger = RunLogger::create(&config.log_dir, Local::now())?.with_min_level(min_level);
    Ok((config, logger))
}
