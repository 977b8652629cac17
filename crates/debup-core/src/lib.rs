mod log;
mod parse;
mod retention;
mod types;

pub use log::{
    format_log_line, LogLevel, LogSink, MemoryLog, RunLogger, LOG_FILE_PREFIX, LOG_FILE_SUFFIX,
};
pub use parse::{parse_upgradable_list, parse_upgraded_packages};
pub use retention::{clean_old_logs, clean_old_logs_at, is_retained_log_name};
pub use types::{CommandResult, PackageName, RetentionPolicy};
