use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};

pub const LOG_FILE_PREFIX: &str = "update_";
pub const LOG_FILE_SUFFIX: &str = ".log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    fn console_style(self) -> Style {
        match self {
            Self::Debug => Style::new().effects(Effects::DIMMED),
            Self::Info => Style::new().fg_color(Some(AnsiColor::BrightGreen.into())),
            Self::Warning => Style::new()
                .fg_color(Some(AnsiColor::BrightYellow.into()))
                .effects(Effects::BOLD),
            Self::Error => Style::new()
                .fg_color(Some(AnsiColor::BrightRed.into()))
                .effects(Effects::BOLD),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only destination for the run log.
///
/// One sink is built at startup and handed by reference to every component.
pub trait LogSink {
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

pub fn format_log_line(timestamp: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!(
        "{} - {} - {}",
        timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
        level,
        message
    )
}

const MAX_NAME_ATTEMPTS: u32 = 100;

pub(crate) fn log_file_name(started_at: DateTime<Local>, attempt: u32) -> String {
    let stamp = started_at.format("%Y%m%d_%H%M%S_%3f");
    if attempt == 0 {
        format!("{LOG_FILE_PREFIX}{stamp}{LOG_FILE_SUFFIX}")
    } else {
        format!("{LOG_FILE_PREFIX}{stamp}-{attempt}{LOG_FILE_SUFFIX}")
    }
}

// Every run gets its own file, even when two runs start in the same millisecond.
fn create_run_file(dir: &Path, started_at: DateTime<Local>) -> Result<(PathBuf, File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(log_file_name(started_at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to create log file: {}", path.display()))
            }
        }
    }
    anyhow::bail!(
        "failed to create log file: {MAX_NAME_ATTEMPTS} names already taken in {}",
        dir.display()
    )
}

/// Writes every line to the per-run log file and echoes it to stdout.
pub struct RunLogger {
    path: PathBuf,
    file: Mutex<File>,
    colored_console: bool,
    min_level: LogLevel,
}

impl RunLogger {
    pub fn create(dir: &Path, started_at: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

        let (path, file) = create_run_file(dir, started_at)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            colored_console: io::stdout().is_terminal(),
            min_level: LogLevel::Info,
        })
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn echo(&self, timestamp: DateTime<Local>, level: LogLevel, message: &str) {
        let line = if self.colored_console {
            let style = level.console_style();
            format!(
                "{} - {}{}{} - {}",
                timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
                style.render(),
                level,
                style.render_reset(),
                message
            )
        } else {
            format_log_line(timestamp, level, message)
        };
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }
}

impl LogSink for RunLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Local::now();
        self.echo(timestamp, level, message);

        let line = format_log_line(timestamp, level, message);
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(err) = writeln!(file, "{line}") {
            tracing::debug!(path = %self.path.display(), "failed writing log line: {err}");
        }
    }
}

/// Sink that keeps entries in memory instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.entries()
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries()
            .iter()
            .any(|(level, _)| *level == LogLevel::Error)
    }
}

impl LogSink for MemoryLog {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}
