// src/supervisor.rs

//! Supervisor façade.
//!
//! Composes discovery, launching, termination, the startup sequencer and the
//! log tailer into the operations an operator issues against the catalog.
//! The catalog is re-read on every call; nothing about workers is cached.
//!
//! Every failure leaving the façade is logged and also reported as an
//! `error` notification through the event sink.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{CatalogSource, ConfigFile, Settings, WorkerDescriptor};
use crate::engine::tail::TickSource;
use crate::engine::{BulkStartSummary, LogTailer, StartupSequencer, TailOptions};
use crate::errors::{Result, SupervisorError};
use crate::events::EventSink;
use crate::process::{LaunchContext, LaunchResult, ProcessBackend, RetryPolicy, RunningProcess};
use crate::types::LaunchMode;

/// A running process matched to its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningWorker {
    pub name: String,
    pub pid: u32,
    pub executable_path: PathBuf,
}

/// One catalog entry together with its running process, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub name: String,
    pub executable_path: PathBuf,
    pub start_order: u8,
    pub active: bool,
    pub pid: Option<u32>,
}

impl WorkerStatus {
    pub fn is_running(&self) -> bool {
        self.pid.is_some()
    }
}

/// Outcome of [`Supervisor::stop_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopAllReport {
    pub stopped: Vec<String>,
    /// `(name, error message)` per worker that could not be stopped.
    pub failed: Vec<(String, String)>,
}

impl StopAllReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Supervisor<B: ProcessBackend> {
    backend: Arc<B>,
    catalog: Arc<dyn CatalogSource>,
    sink: Arc<dyn EventSink>,
    sequencer: StartupSequencer,
    tailer: LogTailer,
    mode_override: Option<LaunchMode>,
    log_delete_retry: RetryPolicy,
}

impl<B: ProcessBackend> Clone for Supervisor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            catalog: Arc::clone(&self.catalog),
            sink: Arc::clone(&self.sink),
            sequencer: self.sequencer.clone(),
            tailer: self.tailer.clone(),
            mode_override: self.mode_override,
            log_delete_retry: self.log_delete_retry,
        }
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    pub fn new(backend: B, catalog: Arc<dyn CatalogSource>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            backend: Arc::new(backend),
            catalog,
            sequencer: StartupSequencer::new(Arc::clone(&sink)),
            tailer: LogTailer::new(Arc::clone(&sink)),
            sink,
            mode_override: None,
            log_delete_retry: RetryPolicy::default(),
        }
    }

    /// Launch in `mode` regardless of the `quiet_mode` setting.
    pub fn with_launch_mode(mut self, mode: LaunchMode) -> Self {
        self.mode_override = Some(mode);
        self
    }

    pub fn with_log_delete_retry(mut self, policy: RetryPolicy) -> Self {
        self.log_delete_retry = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Running processes that belong to a catalog entry.
    pub async fn running_workers(&self) -> Result<Vec<RunningWorker>> {
        let result = self.try_running_workers().await;
        self.report("Running workers", result)
    }

    /// Every catalog entry, in catalog order, with its PID when running.
    pub async fn status(&self) -> Result<Vec<WorkerStatus>> {
        let result = self.try_status().await;
        self.report("Status", result)
    }

    pub async fn is_running(&self, name: &str) -> Result<bool> {
        let running = self.running_workers().await?;
        Ok(running.iter().any(|w| w.name == name))
    }

    /// Start one worker unless a process from the same archive is already
    /// running.
    pub async fn start(&self, name: &str) -> Result<LaunchResult> {
        let result = self.try_start(name).await;
        self.report(name, result)
    }

    /// Force-stop the running process of `name`, returning its PID.
    pub async fn stop(&self, name: &str) -> Result<u32> {
        let result = self.try_stop(name).await;
        self.report(name, result)
    }

    /// Force-stop every running catalog worker.
    ///
    /// Only discovery or catalog failures are returned as errors; a worker
    /// that cannot be stopped is recorded in the report and the rest are
    /// still attempted.
    pub async fn stop_all(&self) -> Result<StopAllReport> {
        let running = self.try_running_workers().await;
        let running = self.report("Stop all", running)?;

        let mut report = StopAllReport::default();
        for worker in running {
            match self.backend.terminate(worker.pid) {
                Ok(()) => {
                    info!(worker = %worker.name, pid = worker.pid, "worker stopped");
                    self.sink.success(&worker.name, "stopped");
                    report.stopped.push(worker.name);
                }
                Err(e) => {
                    error!(worker = %worker.name, pid = worker.pid, error = %e, "failed to stop worker");
                    self.sink.error(&worker.name, &format!("failed to stop: {e}"));
                    report.failed.push((worker.name, e.to_string()));
                }
            }
        }

        debug!(
            stopped = report.stopped.len(),
            failed = report.failed.len(),
            "stop all finished"
        );
        Ok(report)
    }

    /// Start every active worker in `start_order`, `start_delay_secs` apart.
    ///
    /// `Ok(None)` means a bulk start was already in progress.
    pub fn start_all(&self) -> Result<Option<JoinHandle<BulkStartSummary>>> {
        let catalog = self.report("Start all", self.load_catalog())?;
        let delay = Duration::from_secs(catalog.config.start_delay_secs);
        let workers = catalog.worker.clone();
        let catalog = Arc::new(catalog);
        let supervisor = self.clone();

        let launch = move |worker: WorkerDescriptor| {
            let supervisor = supervisor.clone();
            let catalog = Arc::clone(&catalog);
            async move { supervisor.launch_checked(&catalog, &worker).await }
        };

        Ok(self.sequencer.start_all(workers, delay, launch))
    }

    pub fn is_bulk_start_running(&self) -> bool {
        self.sequencer.is_running()
    }

    /// Follow `<log_dir>/jac-<name>.log`.
    pub fn tail(&self, name: &str) -> Result<JoinHandle<()>> {
        let result = self.tail_target(name).and_then(|(path, options)| {
            self.tailer.start(path, options).map_err(SupervisorError::from)
        });
        self.report("Log tail", result)
    }

    /// Like [`Supervisor::tail`], polling on the ticks of `ticks`.
    pub fn tail_with<T: TickSource>(&self, name: &str, ticks: T) -> Result<JoinHandle<()>> {
        let result = self.tail_target(name).and_then(|(path, options)| {
            self.tailer
                .start_with(path, ticks, options.max_batch_lines)
                .map_err(SupervisorError::from)
        });
        self.report("Log tail", result)
    }

    pub fn stop_tail(&self) {
        self.tailer.stop();
    }

    pub fn is_tailing(&self) -> bool {
        self.tailer.is_active()
    }

    async fn try_running_workers(&self) -> Result<Vec<RunningWorker>> {
        let catalog = self.load_catalog()?;
        self.collect_running(&catalog).await
    }

    async fn try_status(&self) -> Result<Vec<WorkerStatus>> {
        let catalog = self.load_catalog()?;
        let processes = self.backend.discover().await?;
        Ok(worker_statuses(&catalog, &processes))
    }

    async fn try_start(&self, name: &str) -> Result<LaunchResult> {
        let catalog = self.load_catalog()?;
        let worker = catalog
            .find_worker(name)
            .cloned()
            .ok_or_else(|| SupervisorError::UnknownWorker(name.to_string()))?;
        self.launch_checked(&catalog, &worker).await
    }

    async fn try_stop(&self, name: &str) -> Result<u32> {
        let running = self.try_running_workers().await?;
        let worker = running
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| SupervisorError::NotRunning(name.to_string()))?;

        self.backend.terminate(worker.pid)?;
        info!(worker = %name, pid = worker.pid, "worker stopped");
        self.sink.success(name, "stopped");
        Ok(worker.pid)
    }

    fn load_catalog(&self) -> Result<ConfigFile> {
        self.catalog
            .load()
            .map_err(|e| SupervisorError::Config(format!("{e:#}")))
    }

    async fn collect_running(&self, catalog: &ConfigFile) -> Result<Vec<RunningWorker>> {
        let processes = self.backend.discover().await?;
        Ok(join_running(catalog, &processes))
    }

    async fn launch_checked(
        &self,
        catalog: &ConfigFile,
        worker: &WorkerDescriptor,
    ) -> Result<LaunchResult> {
        let processes = self.backend.discover().await?;
        if let Some(existing) = processes
            .iter()
            .find(|p| p.executable_path == worker.executable_path)
        {
            warn!(worker = %worker.name, pid = existing.pid, "worker already running");
            return Err(SupervisorError::AlreadyRunning(worker.name.clone()));
        }

        let ctx = self.launch_context(catalog);
        let result = self.backend.launch(worker, &ctx).await?;
        self.sink.info(&worker.name, "starting");
        Ok(result)
    }

    fn launch_context(&self, catalog: &ConfigFile) -> LaunchContext {
        let mode = self
            .mode_override
            .unwrap_or_else(|| LaunchMode::from_quiet(catalog.config.quiet_mode));

        let mut ctx = LaunchContext::new(mode, catalog.config.log_dir())
            .with_global_env(catalog.env.clone());
        ctx.log_delete_retry = self.log_delete_retry;
        ctx
    }

    fn tail_target(&self, name: &str) -> Result<(PathBuf, TailOptions)> {
        let catalog = self.load_catalog()?;
        if catalog.find_worker(name).is_none() {
            return Err(SupervisorError::UnknownWorker(name.to_string()));
        }
        let settings = &catalog.config;
        Ok((settings.log_path_for(name), tail_options(settings)))
    }

    fn report<T>(&self, title: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(operation = title, error = %e, "supervisor operation failed");
            self.sink.error(title, &e.to_string());
        }
        result
    }
}

/// Tail settings taken from `[config]`.
pub fn tail_options(settings: &Settings) -> TailOptions {
    TailOptions {
        poll_interval: Duration::from_millis(settings.tail_poll_ms),
        max_batch_lines: settings.tail_batch_lines,
    }
}

/// Match discovered processes to catalog entries by archive path.
///
/// Processes with no catalog entry are left out. If several entries share an
/// archive, the first one in catalog order claims the process.
pub fn join_running(catalog: &ConfigFile, processes: &[RunningProcess]) -> Vec<RunningWorker> {
    processes
        .iter()
        .filter_map(|p| {
            catalog
                .worker
                .iter()
                .find(|w| w.executable_path == p.executable_path)
                .map(|w| RunningWorker {
                    name: w.name.clone(),
                    pid: p.pid,
                    executable_path: p.executable_path.clone(),
                })
        })
        .collect()
}

pub fn worker_statuses(catalog: &ConfigFile, processes: &[RunningProcess]) -> Vec<WorkerStatus> {
    catalog
        .worker
        .iter()
        .map(|w| WorkerStatus {
            name: w.name.clone(),
            executable_path: w.executable_path.clone(),
            start_order: w.start_order,
            active: w.active,
            pid: processes
                .iter()
                .find(|p| p.executable_path == w.executable_path)
                .map(|p| p.pid),
        })
        .collect()
}
