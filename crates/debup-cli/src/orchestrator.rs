use std::fmt;

use debup_core::{LogSink, RetentionPolicy};
use debup_host::{check_disk_space, CommandExecutor, Environment};

use crate::config::RunConfiguration;
use crate::error::UpdateError;
use crate::runner::{CommandRunner, PackageReport};

const UPDATE_ARGS: &[&str] = &["update"];
const LIST_UPGRADABLE_ARGS: &[&str] = &["list", "--upgradable"];
const UPGRADE_ARGS: &[&str] = &["upgrade", "-y"];
const CLEANUP_SEQUENCE: &[&[&str]] = &[&["autoremove", "-y"], &["clean"], &["autoclean"]];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    DiskCheck,
    LogRetention,
    AptUpdate,
    ListUpgradable,
    AptUpgrade,
    Cleanup,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DiskCheck => "disk-check",
            Self::LogRetention => "log-retention",
            Self::AptUpdate => "update",
            Self::ListUpgradable => "list-upgradable",
            Self::AptUpgrade => "upgrade",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Drives one update run from the disk check to completion.
///
/// The privilege gate runs before the log sink exists, so callers check it
/// before constructing the orchestrator.
pub(crate) struct UpdateOrchestrator<'a> {
    config: &'a RunConfiguration,
    env: &'a dyn Environment,
    runner: CommandRunner<'a>,
    log: &'a dyn LogSink,
}

impl<'a> UpdateOrchestrator<'a> {
    pub(crate) fn new(
        config: &'a RunConfiguration,
        env: &'a dyn Environment,
        executor: &'a dyn CommandExecutor,
        log: &'a dyn LogSink,
    ) -> Self {
        Self {
            config,
            env,
            runner: CommandRunner::new(executor, log),
            log,
        }
    }

    pub(crate) fn run(&self) -> Result<(), UpdateError> {
        self.log.info(&format!(
            "Starting system update (upgrade: {}, cleanup: {}, log retention: {} days)",
            yes_no(!self.config.skip_upgrade),
            yes_no(self.config.run_cleanup),
            self.config.log_retention_days
        ));

        match self.run_stages() {
            Ok(()) => {
                self.enter(Stage::Done);
                self.log.info("System update completed successfully");
                Ok(())
            }
            Err(err) => {
                self.enter(Stage::Aborted);
                self.log.error(&format!("System update aborted: {err}"));
                Err(err)
            }
        }
    }

    fn run_stages(&self) -> Result<(), UpdateError> {
        self.enter(Stage::DiskCheck);
        let space = check_disk_space(self.env, self.config.min_free_gb)?;
        if !space.is_sufficient() {
            return Err(UpdateError::Resource {
                free_gb: space.free_gb,
                minimum_gb: space.minimum_gb,
            });
        }

        self.enter(Stage::LogRetention);
        RetentionPolicy::new(&self.config.log_dir, self.config.log_retention_days).apply(self.log);

        self.enter(Stage::AptUpdate);
        self.run_required(UPDATE_ARGS)?;

        self.enter(Stage::ListUpgradable);
        let upgradable = self.list_upgradable();

        if self.config.skip_upgrade {
            self.log.info("Skipping upgrade as requested");
        } else if upgradable.is_empty() {
            self.log.info("Nothing to upgrade");
        } else {
            self.enter(Stage::AptUpgrade);
            let argv = self.config.package_command(UPGRADE_ARGS);
            if self
                .runner
                .run_parsed(&argv, PackageReport::Upgraded)
                .is_none()
            {
                return Err(UpdateError::command(&argv));
            }
        }

        if self.config.run_cleanup {
            self.enter(Stage::Cleanup);
            for args in CLEANUP_SEQUENCE {
                self.run_required(args)?;
            }
        }

        Ok(())
    }

    // A failed listing counts as nothing to upgrade rather than aborting.
    fn list_upgradable(&self) -> Vec<String> {
        let argv = self.config.package_command(LIST_UPGRADABLE_ARGS);
        match self.runner.run_parsed(&argv, PackageReport::Upgradable) {
            Some(packages) => packages,
            None => {
                self.log
                    .warn("Could not list upgradable packages; continuing as if none are pending");
                Vec::new()
            }
        }
    }

    fn run_required(&self, args: &[&str]) -> Result<(), UpdateError> {
        let argv = self.config.package_command(args);
        if self.runner.run(&argv) {
            Ok(())
        } else {
            Err(UpdateError::command(&argv))
        }
    }

    fn enter(&self, stage: Stage) {
        tracing::debug!(%stage, "entering stage");
        self.log.debug(&format!("Stage: {stage}"));
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
