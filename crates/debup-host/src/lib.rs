mod environment;
mod executor;

pub use environment::{
    check_disk_space, check_privileges, DiskSpace, Environment, HostEnvironment, BYTES_PER_GIB,
};
pub use executor::{CommandExecutor, SystemCommandExecutor};

#[cfg(test)]
mod tests;
