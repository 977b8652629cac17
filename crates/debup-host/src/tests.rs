use std::path::Path;

use anyhow::anyhow;

use super::*;

struct FixedEnvironment {
    privileged: bool,
    free_bytes: Option<u64>,
}

impl Environment for FixedEnvironment {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn free_space_bytes(&self, _path: &Path) -> anyhow::Result<u64> {
        self.free_bytes.ok_or_else(|| anyhow!("statvfs unavailable"))
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[test]
fn privilege_check_reflects_environment() {
    let root = FixedEnvironment {
        privileged: true,
        free_bytes: Some(0),
    };
    let user = FixedEnvironment {
        privileged: false,
        free_bytes: Some(0),
    };
    assert!(check_privileges(&root));
    assert!(!check_privileges(&user));
}

#[test]
fn disk_space_check_passes_at_threshold() {
    let env = FixedEnvironment {
        privileged: true,
        free_bytes: Some(BYTES_PER_GIB),
    };
    let space = check_disk_space(&env, 1.0).expect("must check space");
    assert!(space.is_sufficient());
    assert_eq!(space.free_gb, 1.0);
}

#[test]
fn disk_space_check_fails_below_threshold() {
    let env = FixedEnvironment {
        privileged: true,
        free_bytes: Some(BYTES_PER_GIB - 1),
    };
    let space = check_disk_space(&env, 1.0).expect("must check space");
    assert!(!space.is_sufficient());
    assert!(space.free_gb < 1.0 && space.free_gb > 0.99);
    assert_eq!(space.minimum_gb, 1.0);
    assert!(check_disk_space(&env, 0.5)
        .expect("must check space")
        .is_sufficient());
}

#[test]
fn disk_space_check_propagates_query_failure() {
    let env = FixedEnvironment {
        privileged: true,
        free_bytes: None,
    };
    let err = check_disk_space(&env, 1.0).expect_err("query failure must surface");
    assert!(err.to_string().contains("statvfs unavailable"));
}

#[test]
fn host_environment_reports_free_space_for_root() {
    let env = HostEnvironment::new();
    assert_eq!(env.root_path(), Path::new("/"));
    env.free_space_bytes(env.root_path())
        .expect("statvfs on / must succeed");
}

#[cfg(unix)]
#[test]
fn system_executor_captures_output_and_success() {
    let executor = SystemCommandExecutor::new();
    let result = executor.execute(&argv(&["sh", "-c", "echo listed; echo warned >&2"]));
    assert!(result.success);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.stdout.trim(), "listed");
    assert_eq!(result.stderr.trim(), "warned");
    assert_eq!(result.argv, argv(&["sh", "-c", "echo listed; echo warned >&2"]));
}

#[cfg(unix)]
#[test]
fn system_executor_reports_nonzero_exit() {
    let executor = SystemCommandExecutor::new();
    let result = executor.execute(&argv(&["sh", "-c", "echo 'E: lock held' >&2; exit 100"]));
    assert!(!result.success);
    assert_eq!(result.exit_code, Some(100));
    assert_eq!(result.stderr.trim(), "E: lock held");
}

#[cfg(unix)]
#[test]
fn system_executor_passes_configured_environment() {
    let executor = SystemCommandExecutor::noninteractive();
    let result = executor.execute(&argv(&["sh", "-c", "printf %s \"$DEBIAN_FRONTEND\""]));
    assert!(result.success);
    assert_eq!(result.stdout, "noninteractive");
}

#[test]
fn system_executor_reports_launch_failure() {
    let executor = SystemCommandExecutor::new();
    let result = executor.execute(&argv(&["debup-test-no-such-program-7f3a"]));
    assert!(!result.success);
    assert_eq!(result.exit_code, None);
    assert!(result
        .stderr
        .contains("failed launching debup-test-no-such-program-7f3a"));
}

#[test]
fn system_executor_rejects_empty_command_line() {
    let result = SystemCommandExecutor::new().execute(&[]);
    assert!(!result.success);
    assert_eq!(result.stderr, "empty command line");
}
