use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

pub(crate) const DEFAULT_SETTINGS_PATH: &str = "/etc/debup/config.toml";
pub(crate) const DEFAULT_LOG_DIR: &str = "/var/log/debup";
pub(crate) const DEFAULT_LOG_RETENTION_DAYS: u64 = 365;
pub(crate) const DEFAULT_MIN_FREE_GB: f64 = 1.0;
pub(crate) const DEFAULT_PACKAGE_MANAGER: &str = "apt";

#[derive(Parser, Debug)]
#[command(name = "debup")]
#[command(about = "Refresh, upgrade and clean Debian packages with a rotating run log", long_about = None)]
pub(crate) struct Cli {
    /// Refresh the package index and report upgrades without installing them
    #[arg(long)]
    pub(crate) no_upgrade: bool,
    /// Run autoremove, clean and autoclean after upgrading
    #[arg(long)]
    pub(crate) clean: bool,
    /// Delete run logs older than this many days [default: 365]
    #[arg(long = "log-retention", value_name = "DAYS")]
    pub(crate) log_retention: Option<u64>,
    /// Directory for run logs [default: /var/log/debup]
    #[arg(long, value_name = "DIR")]
    pub(crate) log_dir: Option<PathBuf>,
    /// Minimum free space on / in GB before anything is changed [default: 1]
    #[arg(long, value_name = "GB")]
    pub(crate) min_free_gb: Option<f64>,
    /// Settings file to read [default: /etc/debup/config.toml, if present]
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Also write DEBUG lines to the run log
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) log_dir: PathBuf,
    pub(crate) log_retention_days: u64,
    pub(crate) min_free_gb: f64,
    pub(crate) package_manager: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            min_free_gb: DEFAULT_MIN_FREE_GB,
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
        }
    }
}

pub(crate) fn parse_settings(raw: &str) -> Result<Settings> {
    toml::from_str(raw).context("failed to parse settings")
}

/// Reads the settings file. The default location is optional, an explicit one is not.
pub(crate) fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_PATH));
    if explicit.is_none() && !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid settings file: {}", path.display()))
}

/// Immutable per-run options after merging flags over settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunConfiguration {
    pub(crate) skip_upgrade: bool,
    pub(crate) run_cleanup: bool,
    pub(crate) log_retention_days: u64,
    pub(crate) log_dir: PathBuf,
    pub(crate) min_free_gb: f64,
    pub(crate) package_manager: String,
    pub(crate) verbose: bool,
}

impl RunConfiguration {
    pub(crate) fn resolve(cli: &Cli, settings: Settings) -> Result<Self> {
        let min_free_gb = cli.min_free_gb.unwrap_or(settings.min_free_gb);
        if !min_free_gb.is_finite() || min_free_gb < 0.0 {
            anyhow::bail!("minimum free space must be a non-negative number of GB: {min_free_gb}");
        }

        let package_manager = settings.package_manager.trim().to_string();
        if package_manager.is_empty() {
            anyhow::bail!("package_manager must not be empty");
        }

        Ok(Self {
            skip_upgrade: cli.no_upgrade,
            run_cleanup: cli.clean,
            log_retention_days: cli.log_retention.unwrap_or(settings.log_retention_days),
            log_dir: cli.log_dir.clone().unwrap_or(settings.log_dir),
            min_free_gb,
            package_manager,
            verbose: cli.verbose,
        })
    }

    pub(crate) fn package_command(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.package_manager.clone())
            .chain(args.iter().map(|arg| arg.to_string()))
            .collect()
    }
}
