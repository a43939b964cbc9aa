// src/process/discovery.rs

//! Discovery of running workers through the JVM process-listing tool.
//!
//! `jps -lv` prints one JVM per line: the PID, then the main class or the
//! archive path, then the JVM flags. Only archive-launched JVMs are workers.

use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::DiscoveryError;
use crate::process::platform;

/// Suffix identifying a worker archive in the listing (compared lowercase).
pub const WORKER_ARCHIVE_SUFFIX: &str = ".jar";

/// A running JVM that was started from a worker archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    pub pid: u32,
    pub executable_path: PathBuf,
}

/// Run the listing tool and parse its output.
///
/// Fails if the tool cannot be started or exits unsuccessfully; the tool's
/// stderr is attached to the error.
pub async fn list_running_workers(tool: &str) -> Result<Vec<RunningProcess>, DiscoveryError> {
    let mut std_cmd = StdCommand::new(tool);
    std_cmd.arg("-lv").stdin(Stdio::null());
    platform::hide_console(&mut std_cmd);

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(true);

    let output = cmd.output().await.map_err(|source| DiscoveryError::Unavailable {
        tool: tool.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(DiscoveryError::Failed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let processes = parse_listing(&stdout, &cwd);

    debug!(tool, count = processes.len(), "discovered running workers");
    Ok(processes)
}

/// Parse listing output into running worker processes.
///
/// A line is kept only when it has at least two whitespace-separated fields,
/// the first is a positive PID and the second ends in `.jar`
/// (case-insensitive). Relative archive paths are resolved against `cwd`.
/// Everything else is skipped.
pub fn parse_listing(output: &str, cwd: &Path) -> Vec<RunningProcess> {
    output
        .lines()
        .filter_map(|line| parse_line(line, cwd))
        .collect()
}

fn parse_line(line: &str, cwd: &Path) -> Option<RunningProcess> {
    let mut fields = line.split_whitespace();
    let pid_field = fields.next()?;
    let command = fields.next()?;

    let pid = match pid_field.parse::<u32>() {
        Ok(pid) if pid > 0 => pid,
        _ => {
            trace!(line, "skipping listing line without a valid pid");
            return None;
        }
    };

    if !command.to_lowercase().ends_with(WORKER_ARCHIVE_SUFFIX) {
        return None;
    }

    let path = Path::new(command);
    let executable_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    Some(RunningProcess {
        pid,
        executable_path,
    })
}
