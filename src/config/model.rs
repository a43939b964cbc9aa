// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from `Jac.toml`.
///
/// ```toml
/// [config]
/// start_delay_secs = 15
/// quiet_mode = true
///
/// [[env]]
/// name = "SPRING_PROFILES_ACTIVE"
/// value = "dev"
///
/// [[worker]]
/// name = "billing"
/// jar = "/opt/billing/billing.jar"
/// args = ["-Xmx512m", "-Dserver.port=8081"]
/// start_order = 1
/// ```
///
/// Workers are kept in file order; that order breaks ties between equal
/// `start_order` ranks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: Settings,

    /// Catalog-wide environment variables from `[[env]]`.
    #[serde(default)]
    pub env: Vec<EnvVariable>,

    /// Worker descriptors from `[[worker]]`.
    #[serde(default)]
    pub worker: Vec<WorkerDescriptor>,
}

impl ConfigFile {
    /// Resolve `name`, preferring an active entry over an inactive one that
    /// shares the name.
    pub fn find_worker(&self, name: &str) -> Option<&WorkerDescriptor> {
        self.active_workers()
            .find(|w| w.name == name)
            .or_else(|| self.worker.iter().find(|w| w.name == name))
    }

    /// Workers that take part in a bulk start, in file order.
    pub fn active_workers(&self) -> impl Iterator<Item = &WorkerDescriptor> {
        self.worker.iter().filter(|w| w.active)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Pause between two consecutive launches of a bulk start.
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: u64,

    /// Launch workers detached with output redirected to their log file.
    #[serde(default)]
    pub quiet_mode: bool,

    /// Directory holding `jac-<name>.log` files.
    ///
    /// Relative paths are resolved against the config file's directory by
    /// the loader; when omitted it is `logs/` next to the config file.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log tail polling interval in milliseconds.
    #[serde(default = "default_tail_poll_ms")]
    pub tail_poll_ms: u64,

    /// Maximum number of lines delivered in one tail event.
    #[serde(default = "default_tail_batch_lines")]
    pub tail_batch_lines: usize,

    /// Command used to list running JVMs.
    #[serde(default = "default_discovery_tool")]
    pub discovery_tool: String,
}

fn default_start_delay_secs() -> u64 {
    15
}

fn default_tail_poll_ms() -> u64 {
    200
}

fn default_tail_batch_lines() -> usize {
    2000
}

fn default_discovery_tool() -> String {
    "jps".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_delay_secs: default_start_delay_secs(),
            quiet_mode: false,
            log_dir: None,
            tail_poll_ms: default_tail_poll_ms(),
            tail_batch_lines: default_tail_batch_lines(),
            discovery_tool: default_discovery_tool(),
        }
    }
}

impl Settings {
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Conventional log file of a worker.
    pub fn log_path_for(&self, worker_name: &str) -> PathBuf {
        self.log_dir().join(log_file_name(worker_name))
    }
}

/// File name of a worker's log, e.g. `jac-billing.log`.
pub fn log_file_name(worker_name: &str) -> String {
    format!("jac-{worker_name}.log")
}

/// A single environment variable entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvVariable {
    pub name: String,

    #[serde(default)]
    pub value: String,

    /// Disabled entries are kept in the file but never applied.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl EnvVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[[worker]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerDescriptor {
    /// Unique among active workers.
    pub name: String,

    /// Path to the runnable archive.
    #[serde(rename = "jar", default)]
    pub executable_path: PathBuf,

    /// If `None`, the archive's parent directory is used.
    #[serde(rename = "working_dir", default)]
    pub working_directory: Option<PathBuf>,

    /// Launch tokens placed before `-jar`.
    ///
    /// Entries such as `"-Dkey=value -Xmx1g"` are split on whitespace at
    /// launch time.
    #[serde(rename = "args", default)]
    pub arguments: Vec<String>,

    #[serde(rename = "env", default)]
    pub environment: Vec<EnvVariable>,

    #[serde(default)]
    pub start_order: u8,

    /// Whether the worker takes part in a bulk start.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl WorkerDescriptor {
    /// Working directory for the process: explicit, or the archive's parent.
    pub fn effective_working_dir(&self) -> Option<&Path> {
        match &self.working_directory {
            Some(dir) if !dir.as_os_str().is_empty() => Some(dir.as_path()),
            _ => self
                .executable_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn has_executable(&self) -> bool {
        !self
            .executable_path
            .to_string_lossy()
            .trim()
            .is_empty()
    }
}
