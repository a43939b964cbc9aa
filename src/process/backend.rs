// src/process/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervisor and the startup sequencer talk to a `ProcessBackend`
//! instead of calling discovery / launch / terminate directly. This makes it
//! easy to swap in a fake backend in tests that records launches and
//! terminations without touching real processes.

use std::future::Future;
use std::pin::Pin;

use crate::config::WorkerDescriptor;
use crate::errors::{DiscoveryError, LaunchError, TerminateError};

use super::discovery::{RunningProcess, list_running_workers};
use super::launcher::{LaunchContext, LaunchResult, launch};
use super::terminator::terminate;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstracting how worker processes are found, started and stopped.
///
/// Production code uses [`RealProcessBackend`]; tests provide their own
/// implementation.
pub trait ProcessBackend: Send + Sync + 'static {
    /// Enumerate running worker processes.
    fn discover(&self) -> BoxFuture<'_, Result<Vec<RunningProcess>, DiscoveryError>>;

    /// Start a worker.
    fn launch<'a>(
        &'a self,
        worker: &'a WorkerDescriptor,
        ctx: &'a LaunchContext,
    ) -> BoxFuture<'a, Result<LaunchResult, LaunchError>>;

    /// Forcefully stop a process.
    fn terminate(&self, pid: u32) -> Result<(), TerminateError>;
}

/// Backend that lists JVMs with the configured tool and spawns real
/// processes.
#[derive(Debug, Clone)]
pub struct RealProcessBackend {
    discovery_tool: String,
}

impl RealProcessBackend {
    pub fn new(discovery_tool: impl Into<String>) -> Self {
        Self {
            discovery_tool: discovery_tool.into(),
        }
    }
}

impl Default for RealProcessBackend {
    fn default() -> Self {
        Self::new("jps")
    }
}

impl ProcessBackend for RealProcessBackend {
    fn discover(&self) -> BoxFuture<'_, Result<Vec<RunningProcess>, DiscoveryError>> {
        Box::pin(list_running_workers(&self.discovery_tool))
    }

    fn launch<'a>(
        &'a self,
        worker: &'a WorkerDescriptor,
        ctx: &'a LaunchContext,
    ) -> BoxFuture<'a, Result<LaunchResult, LaunchError>> {
        Box::pin(launch(worker, ctx))
    }

    fn terminate(&self, pid: u32) -> Result<(), TerminateError> {
        terminate(pid)
    }
}
