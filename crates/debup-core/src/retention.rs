use std::fs::{self, Metadata};
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

use crate::log::{LOG_FILE_PREFIX, LOG_FILE_SUFFIX};
use crate::{LogSink, RetentionPolicy};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

impl RetentionPolicy {
    pub fn apply(&self, log: &dyn LogSink) -> usize {
        clean_old_logs(&self.directory, self.retention_days, log)
    }
}

/// Returns true for names this tool writes, `update_*.log`.
pub fn is_retained_log_name(name: &str) -> bool {
    name.len() >= LOG_FILE_PREFIX.len() + LOG_FILE_SUFFIX.len()
        && name.starts_with(LOG_FILE_PREFIX)
        && name.ends_with(LOG_FILE_SUFFIX)
}

/// Deletes run logs older than `retention_days` whole days and returns how many
/// were removed. Scan failures are logged and never propagated.
pub fn clean_old_logs(dir: &Path, retention_days: u64, log: &dyn LogSink) -> usize {
    clean_old_logs_at(dir, retention_days, SystemTime::now(), log)
}

pub fn clean_old_logs_at(
    dir: &Path,
    retention_days: u64,
    now: SystemTime,
    log: &dyn LogSink,
) -> usize {
    let mut deleted = 0;
    if let Err(err) = prune_expired_logs(dir, retention_days, now, &mut deleted) {
        log.error(&format!("Error while cleaning old logs: {err:#}"));
    }
    if deleted > 0 {
        log.info(&format!("Deleted {deleted} old log file(s)"));
    }
    deleted
}

fn prune_expired_logs(
    dir: &Path,
    retention_days: u64,
    now: SystemTime,
    deleted: &mut usize,
) -> Result<()> {
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_retained_log_name(name) {
            continue;
        }

        let path = entry.path();
        let metadata = entry
            .metadata()
            .with_context(|| format!("failed to stat log file: {}", path.display()))?;
        if !metadata.is_file() {
            continue;
        }

        let age_days = age_in_days(&metadata, now)?;
        if age_days > retention_days {
            fs::remove_file(&path)
                .with_context(|| format!("failed to delete old log: {}", path.display()))?;
            tracing::debug!(path = %path.display(), age_days, "deleted expired log");
            *deleted += 1;
        } else {
            tracing::debug!(path = %path.display(), age_days, "kept log");
        }
    }
    Ok(())
}

// Filesystems without birth time report only the modification time.
fn age_in_days(metadata: &Metadata, now: SystemTime) -> Result<u64> {
    let created = metadata
        .created()
        .or_else(|_| metadata.modified())
        .context("log file has no usable timestamp")?;
    let age = now.duration_since(created).unwrap_or(Duration::ZERO);
    Ok(age.as_secs() / SECONDS_PER_DAY)
}
