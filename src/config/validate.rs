// src/config/validate.rs

use std::collections::HashSet;

use anyhow::{Result, anyhow};

use crate::config::model::ConfigFile;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - every worker has a non-blank name
/// - names are unique among active workers
/// - `tail_poll_ms >= 1` and `tail_batch_lines >= 1`
/// - the discovery tool name is not blank
///
/// It does **not** check that archives exist: a missing `jar` is reported by
/// the launcher when the worker is actually started.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_settings(cfg)?;
    validate_worker_names(cfg)?;
    Ok(())
}

fn validate_settings(cfg: &ConfigFile) -> Result<()> {
    if cfg.config.tail_poll_ms == 0 {
        return Err(anyhow!("[config].tail_poll_ms must be >= 1 (got 0)"));
    }

    if cfg.config.tail_batch_lines == 0 {
        return Err(anyhow!("[config].tail_batch_lines must be >= 1 (got 0)"));
    }

    if cfg.config.discovery_tool.trim().is_empty() {
        return Err(anyhow!("[config].discovery_tool must not be empty"));
    }

    Ok(())
}

fn validate_worker_names(cfg: &ConfigFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for (idx, worker) in cfg.worker.iter().enumerate() {
        if worker.name.trim().is_empty() {
            return Err(anyhow!("worker #{} has an empty name", idx + 1));
        }

        if worker.active && !seen.insert(worker.name.as_str()) {
            return Err(anyhow!(
                "worker name '{}' is used by more than one active worker",
                worker.name
            ));
        }
    }

    Ok(())
}
