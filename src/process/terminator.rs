// src/process/terminator.rs

use tracing::{info, warn};

use crate::errors::TerminateError;
use crate::process::platform;

/// Forcefully terminate a worker process.
///
/// PID 0 is rejected before any OS call is made.
pub fn terminate(pid: u32) -> Result<(), TerminateError> {
    if pid == 0 {
        return Err(TerminateError::InvalidPid(pid));
    }

    match platform::force_terminate(pid) {
        Ok(()) => {
            info!(pid, "worker process terminated");
            Ok(())
        }
        Err(e) => {
            warn!(pid, error = %e, "worker process termination failed");
            Err(e)
        }
    }
}
