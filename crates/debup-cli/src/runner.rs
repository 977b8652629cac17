use debup_core::{
    parse_upgradable_list, parse_upgraded_packages, CommandResult, LogSink, PackageName,
};
use debup_host::CommandExecutor;

/// Which package report a command's stdout carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PackageReport {
    Upgradable,
    Upgraded,
}

impl PackageReport {
    fn parse(self, text: &str) -> Vec<PackageName> {
        match self {
            Self::Upgradable => parse_upgradable_list(text),
            Self::Upgraded => parse_upgraded_packages(text),
        }
    }

    fn item_label(self) -> &'static str {
        match self {
            Self::Upgradable => "Upgradable package",
            Self::Upgraded => "Upgraded package",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            Self::Upgradable => "No upgradable packages",
            Self::Upgraded => "No packages upgraded",
        }
    }
}

pub(crate) struct CommandRunner<'a> {
    executor: &'a dyn CommandExecutor,
    log: &'a dyn LogSink,
}

impl<'a> CommandRunner<'a> {
    pub(crate) fn new(executor: &'a dyn CommandExecutor, log: &'a dyn LogSink) -> Self {
        Self { executor, log }
    }

    pub(crate) fn run(&self, argv: &[String]) -> bool {
        self.execute_logged(argv).success
    }

    /// Runs `argv` and, on success, logs every package named in its stdout.
    /// Returns `None` when the command failed.
    pub(crate) fn run_parsed(
        &self,
        argv: &[String],
        report: PackageReport,
    ) -> Option<Vec<PackageName>> {
        let result = self.execute_logged(argv);
        if !result.success {
            return None;
        }

        let packages = report.parse(&result.stdout);
        if packages.is_empty() {
            self.log.info(report.empty_message());
        }
        for package in &packages {
            self.log.info(&format!("{}: {package}", report.item_label()));
        }
        Some(packages)
    }

    fn execute_logged(&self, argv: &[String]) -> CommandResult {
        let result = self.executor.execute(argv);
        let command_line = result.command_line();
        if result.success {
            self.log.info(&format!("Command succeeded: {command_line}"));
        } else {
            let exit = match result.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "no exit code".to_string(),
            };
            self.log.error(&format!(
                "Command failed: {command_line} ({exit}): {}",
                result.stderr.trim()
            ));
        }
        result
    }
}
