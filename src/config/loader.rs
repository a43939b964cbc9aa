// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Load a configuration file and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization and path resolution; it does
/// **not** run semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let mut config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    resolve_paths(&mut config, &config_root_dir(path));
    Ok(config)
}

/// Load a configuration file and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Resolves relative `jar`, `working_dir` and `log_dir` against the
///   config file's directory.
/// - Checks worker names and tail settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// `Jac.toml` in the current working directory, unless `JAC_CONFIG` is set.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("JAC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Jac.toml"))
}

/// Directory relative paths in the config are resolved against.
///
/// A bare file name like `Jac.toml` has an empty parent; the current working
/// directory is used in that case.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn resolve_paths(config: &mut ConfigFile, root: &Path) {
    let log_dir = match config.config.log_dir.take() {
        Some(dir) => absolutize(root, dir),
        None => root.join("logs"),
    };
    config.config.log_dir = Some(log_dir);

    for worker in config.worker.iter_mut() {
        if worker.has_executable() {
            let jar = std::mem::take(&mut worker.executable_path);
            worker.executable_path = absolutize(root, jar);
        }
        if let Some(dir) = worker.working_directory.take() {
            if !dir.as_os_str().is_empty() {
                worker.working_directory = Some(absolutize(root, dir));
            }
        }
    }
}

fn absolutize(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
