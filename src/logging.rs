// src/logging.rs

//! `tracing` subscriber for the `jac` binary.
//!
//! The filter is taken from, in order:
//! 1. `--log-level`, applied to every target;
//! 2. `JAC_LOG`, as `EnvFilter` directives, e.g. `debug` or
//!    `jac::engine::tail=trace,info` to trace only the log tailer;
//! 3. `info`.
//!
//! Logs go to STDERR; stdout carries command output and tailed log lines.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "JAC_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();

    fmt()
        .with_env_filter(build_filter(cli_level, env.as_deref()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// Directives in effect for a CLI level and a `JAC_LOG` value.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_directive(level).to_string();
    }
    match env.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

/// Build the filter; unparsable directives fall back to `info`.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    let directives = filter_directives(cli_level, env);
    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        // No subscriber exists yet to report this through.
        eprintln!("jac: ignoring {LOG_ENV}={directives:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVES)
    })
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
