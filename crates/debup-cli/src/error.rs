use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum UpdateError {
    #[error("this program must be run as root (try sudo)")]
    Privilege,
    #[error("insufficient disk space: {free_gb:.2} GB free on /, {minimum_gb} GB required")]
    Resource { free_gb: f64, minimum_gb: f64 },
    #[error("command failed: {command}")]
    Command { command: String },
    #[error("unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl UpdateError {
    pub(crate) fn command(argv: &[String]) -> Self {
        Self::Command {
            command: argv.join(" "),
        }
    }

    pub(crate) fn exit_code(&self) -> u8 {
        1
    }
}
