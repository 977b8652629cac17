use std::path::Path;

use anyhow::{Context, Result};
use nix::sys::statvfs::statvfs;
use nix::unistd::geteuid;

pub const BYTES_PER_GIB: u64 = 1 << 30;

/// Process-wide facts the update workflow gates on.
pub trait Environment {
    fn is_privileged(&self) -> bool;
    fn free_space_bytes(&self, path: &Path) -> Result<u64>;

    fn root_path(&self) -> &Path {
        Path::new("/")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HostEnvironment;

impl HostEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl Environment for HostEnvironment {
    fn is_privileged(&self) -> bool {
        geteuid().is_root()
    }

    fn free_space_bytes(&self, path: &Path) -> Result<u64> {
        let stats = statvfs(path)
            .with_context(|| format!("failed to query free space for {}", path.display()))?;
        #[allow(clippy::unnecessary_cast)]
        let free = stats.blocks_available() as u64 * stats.fragment_size() as u64;
        Ok(free)
    }
}

/// Measured free space on the root filesystem against the required minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSpace {
    pub free_gb: f64,
    pub minimum_gb: f64,
}

impl DiskSpace {
    pub fn is_sufficient(&self) -> bool {
        self.free_gb >= self.minimum_gb
    }
}

pub fn check_privileges(env: &dyn Environment) -> bool {
    env.is_privileged()
}

pub fn check_disk_space(env: &dyn Environment, minimum_gb: f64) -> Result<DiskSpace> {
    let free = env.free_space_bytes(env.root_path())?;
    let free_gb = free as f64 / BYTES_PER_GIB as f64;
    tracing::debug!(free_gb, minimum_gb, "checked root filesystem free space");
    Ok(DiskSpace {
        free_gb,
        minimum_gb,
    })
}
