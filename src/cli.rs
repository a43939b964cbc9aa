// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::LaunchMode;

/// Command-line arguments for `jac`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jac",
    version,
    about = "Start, stop and watch a catalog of JVM workers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the catalog file (TOML).
    ///
    /// Default: `JAC_CONFIG` if set, else `Jac.toml` in the current working
    /// directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JAC_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse + validate the catalog and print it, without touching processes.
    Check,

    /// Every catalog entry with its running PID.
    Status,

    /// Running workers only.
    Ps,

    /// Start one worker.
    Start {
        name: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Start every active worker in start order.
    StartAll {
        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Force-stop one worker.
    Stop { name: String },

    /// Force-stop every running worker.
    StopAll,

    /// Follow a worker's log file until Ctrl-C.
    Tail { name: String },
}

/// Override of the catalog's `quiet_mode` setting.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct ModeArgs {
    /// Detach the worker and redirect its output to its log file.
    #[arg(long, conflicts_with = "interactive")]
    pub silent: bool,

    /// Run the worker in a visible console.
    #[arg(long)]
    pub interactive: bool,
}

impl ModeArgs {
    pub fn launch_mode(&self) -> Option<LaunchMode> {
        match (self.silent, self.interactive) {
            (true, _) => Some(LaunchMode::Silent),
            (_, true) => Some(LaunchMode::Interactive),
            _ => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
