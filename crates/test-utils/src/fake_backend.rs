use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tokio::time::Instant;

use jac::config::WorkerDescriptor;
use jac::errors::{DiscoveryError, LaunchError, TerminateError};
use jac::process::launcher::merge_env;
use jac::process::{BoxFuture, LaunchContext, LaunchResult, ProcessBackend, RunningProcess};
use jac::types::LaunchMode;

/// One recorded call to [`FakeBackend::launch`] that succeeded.
#[derive(Debug, Clone)]
pub struct LaunchRecord {
    pub name: String,
    pub mode: LaunchMode,
    pub pid: u32,
    pub env: Vec<(String, String)>,
    /// Tokio clock at launch time (meaningful with a paused clock).
    pub at: Instant,
}

#[derive(Debug)]
struct FakeState {
    running: Vec<RunningProcess>,
    next_pid: u32,
    launches: Vec<LaunchRecord>,
    launch_attempts: Vec<String>,
    terminated: Vec<u32>,
    failing_launches: HashSet<String>,
    failing_terminations: HashSet<u32>,
    discovery_fails: bool,
}

/// A fake process backend that:
/// - keeps an in-memory process table, so launched workers show up in
///   discovery and terminated ones disappear from it
/// - records launches and terminations
/// - fails on demand for chosen workers / PIDs
#[derive(Debug)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                running: Vec::new(),
                next_pid: 1000,
                launches: Vec::new(),
                launch_attempts: Vec::new(),
                terminated: Vec::new(),
                failing_launches: HashSet::new(),
                failing_terminations: HashSet::new(),
                discovery_fails: false,
            }),
        }
    }

    /// Pretend a process from `path` is already running.
    pub fn with_running(self, pid: u32, path: impl Into<PathBuf>) -> Self {
        self.state.lock().unwrap().running.push(RunningProcess {
            pid,
            executable_path: path.into(),
        });
        self
    }

    pub fn failing_launch(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_launches
            .insert(name.to_string());
        self
    }

    pub fn failing_terminate(self, pid: u32) -> Self {
        self.state.lock().unwrap().failing_terminations.insert(pid);
        self
    }

    pub fn failing_discovery(self) -> Self {
        self.state.lock().unwrap().discovery_fails = true;
        self
    }

    /// Names of successfully launched workers, in launch order.
    pub fn launched(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .launches
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    pub fn launch_records(&self) -> Vec<LaunchRecord> {
        self.state.lock().unwrap().launches.clone()
    }

    /// Every worker `launch` was called for, including failures.
    pub fn launch_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().launch_attempts.clone()
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().unwrap().terminated.clone()
    }

    pub fn running(&self) -> Vec<RunningProcess> {
        self.state.lock().unwrap().running.clone()
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBackend for FakeBackend {
    fn discover(&self) -> BoxFuture<'_, Result<Vec<RunningProcess>, DiscoveryError>> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            if state.discovery_fails {
                return Err(DiscoveryError::Failed {
                    tool: "fake-jps".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "simulated discovery failure".to_string(),
                });
            }
            Ok(state.running.clone())
        })
    }

    fn launch<'a>(
        &'a self,
        worker: &'a WorkerDescriptor,
        ctx: &'a LaunchContext,
    ) -> BoxFuture<'a, Result<LaunchResult, LaunchError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.launch_attempts.push(worker.name.clone());

            if state.failing_launches.contains(&worker.name) {
                return Err(LaunchError::SpawnFailed {
                    worker: worker.name.clone(),
                    source: io::Error::other("simulated spawn failure"),
                });
            }

            let pid = state.next_pid;
            state.next_pid += 1;
            state.running.push(RunningProcess {
                pid,
                executable_path: worker.executable_path.clone(),
            });
            state.launches.push(LaunchRecord {
                name: worker.name.clone(),
                mode: ctx.mode,
                pid,
                env: merge_env(&ctx.global_env, &worker.environment),
                at: Instant::now(),
            });

            Ok(LaunchResult {
                executable_path: worker.executable_path.clone(),
                pid,
                started_at: Local::now(),
            })
        })
    }

    fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        let mut state = self.state.lock().unwrap();
        if pid == 0 {
            return Err(TerminateError::InvalidPid(pid));
        }
        if state.failing_terminations.contains(&pid) {
            return Err(TerminateError::Kill {
                pid,
                source: io::Error::other("simulated termination failure"),
            });
        }

        state.running.retain(|p| p.pid != pid);
        state.terminated.push(pid);
        Ok(())
    }
}
