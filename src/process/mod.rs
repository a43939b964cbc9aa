// src/process/mod.rs

//! Process layer: finding, starting and stopping worker JVMs.
//!
//! - [`discovery`] runs `jps -lv` and maps PIDs to archive paths.
//! - [`launcher`] starts a worker interactively or silently.
//! - [`terminator`] force-stops a PID.
//! - [`cmdline`] escapes tokens for the Windows console host.
//! - [`platform`] holds the per-OS pieces (console flags, termination).
//! - [`backend`] bundles the above behind the `ProcessBackend` trait so the
//!   supervisor can be driven by a fake in tests.

pub mod backend;
pub mod cmdline;
pub mod discovery;
pub mod launcher;
pub mod platform;
pub mod terminator;

pub use backend::{BoxFuture, ProcessBackend, RealProcessBackend};
pub use discovery::{RunningProcess, list_running_workers, parse_listing};
pub use launcher::{LaunchContext, LaunchResult, RetryPolicy, launch};
pub use terminator::terminate;
