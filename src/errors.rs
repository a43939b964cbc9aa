// src/errors.rs

//! Crate-wide error types.
//!
//! Each component has its own small error enum; [`SupervisorError`] is what
//! the façade surfaces and wraps all of them.

use std::path::PathBuf;

use thiserror::Error;

/// The process-listing tool could not be run or reported failure.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("process listing tool '{tool}' is unavailable: {source}")]
    Unavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process listing tool '{tool}' failed ({status}): {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("invalid worker descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("failed to start worker '{worker}': {source}")]
    SpawnFailed {
        worker: String,
        #[source]
        source: std::io::Error,
    },

    #[error("log file error for {path:?}: {source}")]
    LogFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TerminateError {
    #[error("invalid pid: {0}")]
    InvalidPid(u32),

    #[error("failed to open process {pid}: {source}")]
    Open {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to terminate process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailError {
    #[error("log tail already running")]
    AlreadyRunning,

    #[error("log path is empty")]
    InvalidPath,
}

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Terminate(#[from] TerminateError),

    #[error(transparent)]
    Tail(#[from] TailError),

    #[error("cannot find worker {0}")]
    UnknownWorker(String),

    #[error("worker {0} is already running")]
    AlreadyRunning(String),

    #[error("no running process found for worker {0}")]
    NotRunning(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
