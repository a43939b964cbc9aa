// src/process/platform.rs

//! Host-specific process capabilities.
//!
//! Everything that differs between hosts lives here:
//! - hiding the console of helper processes,
//! - detaching silent workers from the supervisor's console,
//! - building the interactive launch command,
//! - forceful termination of a PID.
//!
//! Commands are configured as `std::process::Command` (which exposes the
//! per-OS extension traits) and converted into `tokio::process::Command` by
//! the callers.

use crate::errors::TerminateError;

pub use imp::{detach, force_terminate, hide_console, interactive_command};

#[cfg(windows)]
mod imp {
    use std::io;
    use std::os::windows::process::CommandExt;
    use std::process::{Command as StdCommand, Stdio};

    use tracing::{debug, warn};
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::System::Threading::{
        CREATE_NO_WINDOW, DETACHED_PROCESS, OpenProcess, PROCESS_TERMINATE, TerminateProcess,
    };

    use super::TerminateError;
    use crate::process::cmdline::{console_command_line, escape_for_console};

    /// Exit code reported by a force-terminated worker.
    const TERMINATED_EXIT_CODE: u32 = 1;

    /// Hide the console window of a short-lived helper (e.g. the listing tool).
    pub fn hide_console(cmd: &mut StdCommand) {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    /// No console window, and no attachment to the supervisor's console.
    pub fn detach(cmd: &mut StdCommand) {
        cmd.creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS);
    }

    /// `cmd.exe /C start "" /min cmd /K <line>`: a new minimized console that
    /// switches the code page and then runs the worker.
    ///
    /// The line is parsed twice, first by the outer `cmd /C`, then by the
    /// console started for the worker, so it is escaped once per layer.
    pub fn interactive_command(program: &str, args: &[String]) -> StdCommand {
        let line = escape_for_console(&console_command_line(program, args));
        debug!(%line, "interactive console command line");

        let mut cmd = StdCommand::new("cmd.exe");
        cmd.args(["/C", "start", "", "/min", "cmd", "/K"])
            .raw_arg(line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Handle opened with termination rights only; closed on drop.
    struct ProcessHandle {
        pid: u32,
        raw: HANDLE,
    }

    impl ProcessHandle {
        fn open_for_termination(pid: u32) -> Result<Self, TerminateError> {
            // SAFETY: no pointer arguments; a null handle signals failure.
            let raw = unsafe { OpenProcess(PROCESS_TERMINATE, 0, pid) };
            if raw.is_null() {
                return Err(TerminateError::Open {
                    pid,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(Self { pid, raw })
        }

        fn terminate(&self) -> Result<(), TerminateError> {
            // SAFETY: `raw` is a live handle owned by `self`.
            let ok = unsafe { TerminateProcess(self.raw, TERMINATED_EXIT_CODE) };
            if ok == 0 {
                return Err(TerminateError::Kill {
                    pid: self.pid,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(())
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: `raw` was returned by OpenProcess and is closed exactly once.
            let ok = unsafe { CloseHandle(self.raw) };
            if ok == 0 {
                warn!(
                    pid = self.pid,
                    error = %io::Error::last_os_error(),
                    "failed to close process handle"
                );
            }
        }
    }

    pub fn force_terminate(pid: u32) -> Result<(), TerminateError> {
        let handle = ProcessHandle::open_for_termination(pid)?;
        handle.terminate()
    }
}

#[cfg(unix)]
mod imp {
    use std::io;
    use std::os::unix::process::CommandExt;
    use std::process::{Command as StdCommand, Stdio};

    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    use super::TerminateError;

    pub fn hide_console(_cmd: &mut StdCommand) {}

    /// New process group, so terminal signals aimed at the supervisor
    /// (Ctrl-C) do not reach the worker.
    pub fn detach(cmd: &mut StdCommand) {
        cmd.process_group(0).stdin(Stdio::null());
    }

    /// The worker runs directly on the operator's terminal. No interpreter is
    /// involved, so arguments need no escaping.
    pub fn interactive_command(program: &str, args: &[String]) -> StdCommand {
        let mut cmd = StdCommand::new(program);
        cmd.args(args)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    pub fn force_terminate(pid: u32) -> Result<(), TerminateError> {
        // PIDs above i32::MAX would wrap to negative values, which address
        // process groups.
        let raw = i32::try_from(pid).map_err(|_| TerminateError::InvalidPid(pid))?;
        kill(Pid::from_raw(raw), Signal::SIGKILL).map_err(|errno| TerminateError::Kill {
            pid,
            source: io::Error::from(errno),
        })
    }
}
