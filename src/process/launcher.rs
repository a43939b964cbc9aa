// src/process/launcher.rs

//! Worker process launcher.
//!
//! Both modes run `java <args...> -jar <archive>` with the ambient
//! environment extended by the catalog's global variables and the worker's
//! own variables (later entries win).
//!
//! - [`LaunchMode::Interactive`] goes through the platform's console host.
//! - [`LaunchMode::Silent`] spawns `java` directly, detached, with stdout
//!   and stderr redirected into the worker's log file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{EnvVariable, WorkerDescriptor, log_file_name};
use crate::errors::LaunchError;
use crate::process::platform;
use crate::types::LaunchMode;

/// Program used to run worker archives.
pub const JAVA: &str = "java";

/// Outcome of a successful launch. Carries no ownership of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResult {
    pub executable_path: PathBuf,
    pub pid: u32,
    pub started_at: DateTime<Local>,
}

/// Everything a launch needs besides the descriptor itself.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub mode: LaunchMode,
    pub log_dir: PathBuf,
    pub global_env: Vec<EnvVariable>,
    pub log_delete_retry: RetryPolicy,
}

impl LaunchContext {
    pub fn new(mode: LaunchMode, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            log_dir: log_dir.into(),
            global_env: Vec::new(),
            log_delete_retry: RetryPolicy::default(),
        }
    }

    pub fn with_global_env(mut self, env: Vec<EnvVariable>) -> Self {
        self.global_env = env;
        self
    }
}

/// Bounded retry for deleting a log file still held by a previous instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(150),
        }
    }
}

/// Launch a worker in the given mode.
pub async fn launch(
    worker: &WorkerDescriptor,
    ctx: &LaunchContext,
) -> Result<LaunchResult, LaunchError> {
    if !worker.has_executable() {
        return Err(LaunchError::InvalidDescriptor(format!(
            "worker '{}' has an empty archive path",
            worker.name
        )));
    }

    let argv = build_argv(worker);
    let env = merge_env(&ctx.global_env, &worker.environment);

    debug!(
        worker = %worker.name,
        mode = %ctx.mode,
        ?argv,
        "launching worker"
    );

    let result = match ctx.mode {
        LaunchMode::Interactive => launch_interactive(worker, &argv, &env)?,
        LaunchMode::Silent => launch_silent(worker, &argv, &env, ctx).await?,
    };

    info!(
        worker = %worker.name,
        mode = %ctx.mode,
        pid = result.pid,
        "worker process started"
    );
    Ok(result)
}

fn launch_interactive(
    worker: &WorkerDescriptor,
    argv: &[String],
    env: &[(String, String)],
) -> Result<LaunchResult, LaunchError> {
    let mut std_cmd = platform::interactive_command(JAVA, argv);
    apply_common(&mut std_cmd, worker, env);
    spawn_worker(worker, std_cmd)
}

async fn launch_silent(
    worker: &WorkerDescriptor,
    argv: &[String],
    env: &[(String, String)],
    ctx: &LaunchContext,
) -> Result<LaunchResult, LaunchError> {
    let log_path = ctx.log_dir.join(log_file_name(&worker.name));

    remove_log_file(&log_path, ctx.log_delete_retry)
        .await
        .map_err(|source| LaunchError::LogFileError {
            path: log_path.clone(),
            source,
        })?;

    let (stdout_log, stderr_log) =
        create_log_file(&log_path).map_err(|source| LaunchError::LogFileError {
            path: log_path.clone(),
            source,
        })?;

    let mut std_cmd = StdCommand::new(JAVA);
    std_cmd
        .args(argv)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log));
    apply_common(&mut std_cmd, worker, env);
    platform::detach(&mut std_cmd);

    // The command owns both log handles: they are closed when it is dropped,
    // whether or not the spawn succeeded. The child keeps its own copies.
    spawn_worker(worker, std_cmd)
}

fn apply_common(cmd: &mut StdCommand, worker: &WorkerDescriptor, env: &[(String, String)]) {
    cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(dir) = worker.effective_working_dir() {
        cmd.current_dir(dir);
    }
}

fn spawn_worker(worker: &WorkerDescriptor, std_cmd: StdCommand) -> Result<LaunchResult, LaunchError> {
    let mut cmd = Command::from(std_cmd);
    let child = cmd.spawn().map_err(|source| LaunchError::SpawnFailed {
        worker: worker.name.clone(),
        source,
    })?;

    let pid = child.id().ok_or_else(|| LaunchError::SpawnFailed {
        worker: worker.name.clone(),
        source: io::Error::other("process exited before its pid could be read"),
    })?;

    // Dropping the tokio child does not kill the worker; the runtime reaps it
    // if it exits while we are still alive.
    drop(child);

    Ok(LaunchResult {
        executable_path: worker.executable_path.clone(),
        pid,
        started_at: Local::now(),
    })
}

/// Final argument vector: normalized worker arguments, then `-jar <archive>`.
pub fn build_argv(worker: &WorkerDescriptor) -> Vec<String> {
    let mut argv = normalize_args(&worker.arguments);
    argv.push("-jar".to_string());
    argv.push(worker.executable_path.to_string_lossy().into_owned());
    argv
}

/// Re-tokenize raw argument entries.
///
/// Each entry is trimmed; blank entries are dropped; entries containing
/// whitespace (e.g. `"-Xms256m -Xmx1g"` stored as one string) are split.
pub fn normalize_args(raw: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(raw.len());
    for token in raw {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token.contains(char::is_whitespace) {
            out.extend(token.split_whitespace().map(str::to_string));
        } else {
            out.push(token.to_string());
        }
    }
    out
}

/// Variables applied on top of the ambient environment, in order.
///
/// Global entries come first so a worker's own entry with the same name
/// wins. Blank names and inactive entries are dropped.
pub fn merge_env(global: &[EnvVariable], worker: &[EnvVariable]) -> Vec<(String, String)> {
    global
        .iter()
        .chain(worker.iter())
        .filter(|v| v.active)
        .filter_map(|v| {
            let name = v.name.trim();
            if name.is_empty() {
                None
            } else {
                Some((name.to_string(), v.value.clone()))
            }
        })
        .collect()
}

/// Delete a worker log file, retrying while it is still locked.
///
/// A missing file counts as success.
pub async fn remove_log_file(path: &Path, policy: RetryPolicy) -> io::Result<()> {
    remove_with_retry(path, policy, |p| std::fs::remove_file(p)).await
}

/// Retry `remove` up to `policy.attempts` times, sleeping `policy.delay`
/// between attempts. `NotFound` ends the loop successfully.
pub async fn remove_with_retry<F>(path: &Path, policy: RetryPolicy, mut remove: F) -> io::Result<()>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let attempts = policy.attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match remove(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                debug!(?path, attempt, error = %e, "log file delete failed; retrying");
                last_err = Some(e);
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    let err = last_err.unwrap_or_else(|| io::Error::other("log file delete failed"));
    warn!(?path, attempts, error = %err, "giving up deleting log file");
    Err(io::Error::new(
        err.kind(),
        format!("could not delete {} after {attempts} attempts: {err}", path.display()),
    ))
}

/// Create (or truncate) the log file, returning one handle for stdout and
/// one for stderr.
fn create_log_file(path: &Path) -> io::Result<(File, File)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let copy = file.try_clone()?;
    Ok((file, copy))
}
