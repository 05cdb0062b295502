//! Execution of host-configured hook executables

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("failed to run hook {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hook {path} did not finish within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },
}

/// Pick the local hook if it exists, the system-wide one otherwise
pub fn resolve_hook(local: &Path, system: &Path) -> PathBuf {
    if local.is_file() {
        local.to_path_buf()
    } else {
        system.to_path_buf()
    }
}

/// Run `path` with `args` and return the non-empty lines it printed.
///
/// Output is returned whatever the exit status; the child is killed when the timeout expires.
pub async fn run_hook(path: &Path, args: &[&str], timeout: Duration) -> Result<Vec<String>, HookError> {
    let mut command = Command::new(path);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(|source| HookError::Spawn {
            path: path.to_path_buf(),
            source,
        })?,
        Err(_) => {
            return Err(HookError::Timeout {
                path: path.to_path_buf(),
                timeout,
            })
        }
    };

    if !output.status.success() {
        tracing::debug!(hook = %path.display(), status = %output.status, "Hook exited unsuccessfully");
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
