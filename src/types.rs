// src/types.rs

use std::fmt;

/// How a worker process is started.
///
/// - `Interactive`: in a visible (minimized) console window on Windows, or
///   attached to the operator's terminal elsewhere.
/// - `Silent`: fully detached, stdout/stderr redirected to the worker's log
///   file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchMode {
    #[default]
    Interactive,
    Silent,
}

impl LaunchMode {
    /// Mode selected by the `quiet_mode` setting.
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            LaunchMode::Silent
        } else {
            LaunchMode::Interactive
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Interactive => f.write_str("interactive"),
            LaunchMode::Silent => f.write_str("silent"),
        }
    }
}

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warn,
    Error,
    Success,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Info => "info",
            NotificationKind::Warn => "warn",
            NotificationKind::Error => "error",
            NotificationKind::Success => "success",
        };
        f.write_str(s)
    }
}
