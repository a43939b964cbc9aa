// src/engine/sequencer.rs

//! Ordered, delayed, single-flight bulk start.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::WorkerDescriptor;
use crate::engine::single_flight::SingleFlight;
use crate::events::EventSink;
use crate::process::LaunchResult;

/// What a finished bulk start did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkStartSummary {
    /// Names of workers started, in launch order.
    pub started: Vec<String>,
    /// `(name, error message)` for every worker that failed to start.
    pub failed: Vec<(String, String)>,
}

/// Runs bulk starts one at a time.
///
/// A request made while a bulk start is in progress is dropped, not queued.
#[derive(Debug, Clone)]
pub struct StartupSequencer {
    guard: SingleFlight,
    sink: Arc<dyn EventSink>,
}

impl StartupSequencer {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            guard: SingleFlight::new(),
            sink,
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_busy()
    }

    /// Start every active worker in ascending `start_order`, sleeping
    /// `delay` between consecutive launches.
    ///
    /// Returns immediately. `None` means another bulk start holds the guard
    /// and nothing was scheduled. A failed launch is reported and the
    /// sequence moves on to the next worker.
    pub fn start_all<F, Fut, E>(
        &self,
        workers: Vec<WorkerDescriptor>,
        delay: Duration,
        mut launch: F,
    ) -> Option<JoinHandle<BulkStartSummary>>
    where
        F: FnMut(WorkerDescriptor) -> Fut + Send + 'static,
        Fut: Future<Output = Result<LaunchResult, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let Some(permit) = self.guard.try_acquire() else {
            warn!("bulk start already in progress");
            self.sink.warn("Start all", "Bulk start is already in progress");
            return None;
        };

        let sink = Arc::clone(&self.sink);
        let ordered = startup_order(&workers);

        let handle = tokio::spawn(async move {
            // Released when the task ends, including on panic.
            let _permit = permit;

            let total = ordered.len();
            info!(workers = total, delay_ms = delay.as_millis() as u64, "bulk start begins");

            let mut summary = BulkStartSummary::default();

            for (idx, worker) in ordered.into_iter().enumerate() {
                let name = worker.name.clone();

                match launch(worker).await {
                    Ok(result) => {
                        info!(worker = %name, pid = result.pid, "bulk start launched worker");
                        summary.started.push(name);
                    }
                    Err(e) => {
                        error!(worker = %name, error = %e, "bulk start launch failed");
                        sink.error(&name, &format!("failed to start {name}: {e}"));
                        summary.failed.push((name, e.to_string()));
                    }
                }

                if idx + 1 < total {
                    tokio::time::sleep(delay).await;
                }
            }

            info!(
                started = summary.started.len(),
                failed = summary.failed.len(),
                "bulk start finished"
            );
            let message = format!(
                "{} started, {} failed",
                summary.started.len(),
                summary.failed.len()
            );
            if summary.failed.is_empty() {
                sink.info("Start all", &message);
            } else {
                sink.warn("Start all", &message);
            }

            summary
        });

        Some(handle)
    }
}

/// Active workers in launch order: ascending `start_order`, catalog order
/// among equal ranks.
pub fn startup_order(workers: &[WorkerDescriptor]) -> Vec<WorkerDescriptor> {
    let mut ordered: Vec<WorkerDescriptor> =
        workers.iter().filter(|w| w.active).cloned().collect();
    ordered.sort_by_key(|w| w.start_order);
    ordered
}
