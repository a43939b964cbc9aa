// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod process;
pub mod supervisor;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::default_config_path;
use crate::config::{ConfigFile, FileCatalog, load_and_validate};
use crate::events::{ChannelSink, Event, TailEvent};
use crate::process::RealProcessBackend;
use crate::supervisor::Supervisor;
use crate::types::LaunchMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the process backend and the supervisor
/// - the event printer (tailed lines to stdout, notifications to stderr)
/// - Ctrl-C handling for the long-running commands
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;

    if let Command::Check = args.command {
        print_check(&config_path, &cfg);
        return Ok(());
    }

    let (sink, rx) = ChannelSink::channel();
    let printer = spawn_printer(rx);

    let backend = RealProcessBackend::new(cfg.config.discovery_tool.clone());
    let supervisor = Supervisor::new(
        backend,
        Arc::new(FileCatalog::new(config_path)),
        Arc::new(sink),
    );

    let outcome = dispatch(args.command, supervisor).await;

    // All senders are gone once the supervisor and its tasks are; drain what
    // is left before exiting.
    let _ = printer.await;
    outcome
}

async fn dispatch(command: Command, supervisor: Supervisor<RealProcessBackend>) -> Result<()> {
    match command {
        Command::Check => Ok(()),

        Command::Status => {
            let statuses = supervisor.status().await?;
            println!("{:<24} {:>8} {:>6} {:>6}  ARCHIVE", "NAME", "PID", "ORDER", "ACTIVE");
            for s in statuses {
                let pid = s.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} {:>8} {:>6} {:>6}  {}",
                    s.name,
                    pid,
                    s.start_order,
                    s.active,
                    s.executable_path.display()
                );
            }
            Ok(())
        }

        Command::Ps => {
            for w in supervisor.running_workers().await? {
                println!("{:>8}  {:<24} {}", w.pid, w.name, w.executable_path.display());
            }
            Ok(())
        }

        Command::Start { name, mode } => {
            let supervisor = with_mode(supervisor, mode.launch_mode());
            let result = supervisor.start(&name).await?;
            println!("{name} started (pid {})", result.pid);
            Ok(())
        }

        Command::StartAll { mode } => {
            let supervisor = with_mode(supervisor, mode.launch_mode());
            let Some(handle) = supervisor.start_all()? else {
                bail!("a bulk start is already in progress");
            };
            drop(supervisor);
            run_until_ctrl_c(handle, "bulk start").await?;
            Ok(())
        }

        Command::Stop { name } => {
            let pid = supervisor.stop(&name).await?;
            println!("{name} stopped (pid {pid})");
            Ok(())
        }

        Command::StopAll => {
            let report = supervisor.stop_all().await?;
            for name in &report.stopped {
                println!("{name} stopped");
            }
            if !report.is_clean() {
                let names: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
                bail!("failed to stop: {}", names.join(", "));
            }
            Ok(())
        }

        Command::Tail { name } => {
            let mut handle = supervisor.tail(&name)?;
            tokio::select! {
                res = &mut handle => res?,
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        eprintln!("failed to listen for Ctrl+C: {e}");
                    }
                    supervisor.stop_tail();
                    handle.await?;
                }
            }
            Ok(())
        }
    }
}

fn with_mode(
    supervisor: Supervisor<RealProcessBackend>,
    mode: Option<LaunchMode>,
) -> Supervisor<RealProcessBackend> {
    match mode {
        Some(mode) => supervisor.with_launch_mode(mode),
        None => supervisor,
    }
}

/// Wait for a background task; Ctrl-C aborts it.
async fn run_until_ctrl_c<T>(mut handle: JoinHandle<T>, what: &str) -> Result<()> {
    tokio::select! {
        res = &mut handle => {
            res?;
        }
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                eprintln!("failed to listen for Ctrl+C: {e}");
            }
            info!(task = what, "interrupted; abandoning remaining work");
            handle.abort();
        }
    }
    Ok(())
}

fn spawn_printer(mut rx: mpsc::UnboundedReceiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Event::Tail(TailEvent::Lines(lines)) => {
                    for line in lines {
                        println!("{line}");
                    }
                }
                Event::Tail(TailEvent::Started(path)) => {
                    eprintln!("--- tailing {}", path.display());
                }
                Event::Tail(TailEvent::Error(msg)) => eprintln!("--- tail error: {msg}"),
                Event::Tail(TailEvent::Stopped) => eprintln!("--- tail stopped"),
                Event::Notify(n) => eprintln!("[{}] {}: {}", n.kind, n.title, n.message),
            }
        }
        debug!("event printer finished");
    })
}

/// `check` output: the validated catalog, nothing executed.
fn print_check(path: &Path, cfg: &ConfigFile) {
    println!("jac check: {}", path.display());
    println!("  config.start_delay_secs = {}", cfg.config.start_delay_secs);
    println!("  config.quiet_mode = {}", cfg.config.quiet_mode);
    println!("  config.log_dir = {}", cfg.config.log_dir().display());
    println!("  config.discovery_tool = {}", cfg.config.discovery_tool);
    println!();

    if !cfg.env.is_empty() {
        println!("env ({}):", cfg.env.len());
        for var in &cfg.env {
            let flag = if var.active { "" } else { " (inactive)" };
            println!("  {}={}{flag}", var.name, var.value);
        }
        println!();
    }

    println!("workers ({}):", cfg.worker.len());
    for w in &cfg.worker {
        println!("  - {}", w.name);
        println!("      jar: {}", w.executable_path.display());
        if let Some(dir) = w.effective_working_dir() {
            println!("      working_dir: {}", dir.display());
        }
        if !w.arguments.is_empty() {
            println!("      args: {:?}", process::launcher::normalize_args(&w.arguments));
        }
        if !w.environment.is_empty() {
            let names: Vec<&str> = w.environment.iter().map(|v| v.name.as_str()).collect();
            println!("      env: {names:?}");
        }
        println!("      start_order: {}", w.start_order);
        if !w.active {
            println!("      active: false");
        }
    }

    debug!("check complete (no processes touched)");
}
