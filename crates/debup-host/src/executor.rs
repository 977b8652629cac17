use std::process::Command;

use debup_core::CommandResult;

/// Runs one external command to completion and reports what happened.
pub trait CommandExecutor {
    fn execute(&self, argv: &[String]) -> CommandResult;
}

#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    envs: Vec<(String, String)>,
}

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor preset for apt: upgrades never stop at a debconf prompt.
    pub fn noninteractive() -> Self {
        Self::new().with_env("DEBIAN_FRONTEND", "noninteractive")
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, argv: &[String]) -> CommandResult {
        let Some((program, args)) = argv.split_first() else {
            return CommandResult::launch_failure(argv, "empty command line");
        };

        tracing::debug!(command = %argv.join(" "), "spawning command");
        let mut command = Command::new(program);
        command.args(args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        match command.output() {
            Ok(output) => {
                tracing::debug!(
                    command = %argv.join(" "),
                    status = ?output.status.code(),
                    "command finished"
                );
                CommandResult::from_exit(
                    argv,
                    output.status.code(),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
            Err(err) => CommandResult::launch_failure(
                argv,
                format!("failed launching {program}: {err}"),
            ),
        }
    }
}
