use std::path::PathBuf;

/// A bare package identifier as printed by the package manager.
pub type PackageName = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub directory: PathBuf,
    pub retention_days: u64,
}

impl RetentionPolicy {
    pub fn new(directory: impl Into<PathBuf>, retention_days: u64) -> Self {
        Self {
            directory: directory.into(),
            retention_days,
        }
    }
}

/// Captured outcome of one external command invocation.
///
/// `success` is derived from the exit status alone; callers never inspect
/// partial output to decide whether a command worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub argv: Vec<String>,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandResult {
    pub fn from_exit(
        argv: &[String],
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            argv: argv.to_vec(),
            success: exit_code == Some(0),
            exit_code,
            stdout,
            stderr,
        }
    }

    pub fn launch_failure(argv: &[String], reason: impl Into<String>) -> Self {
        Self {
            argv: argv.to_vec(),
            exit_code: None,
            stdout: String::new(),
            stderr: reason.into(),
            success: false,
        }
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}
