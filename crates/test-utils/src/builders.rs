#![allow(dead_code)]

use std::path::PathBuf;

use jac::config::{ConfigFile, EnvVariable, Settings, WorkerDescriptor};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigBuilder {
    config: ConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile {
                config: Settings::default(),
                env: Vec::new(),
                worker: Vec::new(),
            },
        }
    }

    pub fn with_worker(mut self, worker: WorkerDescriptor) -> Self {
        self.config.worker.push(worker);
        self
    }

    pub fn with_global_env(mut self, name: &str, value: &str) -> Self {
        self.config.env.push(EnvVariable::new(name, value));
        self
    }

    pub fn start_delay_secs(mut self, secs: u64) -> Self {
        self.config.config.start_delay_secs = secs;
        self
    }

    pub fn quiet_mode(mut self, quiet: bool) -> Self {
        self.config.config.quiet_mode = quiet;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config.log_dir = Some(dir.into());
        self
    }

    pub fn tail_batch_lines(mut self, lines: usize) -> Self {
        self.config.config.tail_batch_lines = lines;
        self
    }

    pub fn build(self) -> ConfigFile {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WorkerDescriptor`.
///
/// Defaults to an active worker with `/opt/<name>/<name>.jar`, start order 0
/// and no arguments.
pub struct WorkerBuilder {
    worker: WorkerDescriptor,
}

impl WorkerBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            worker: WorkerDescriptor {
                name: name.to_string(),
                executable_path: PathBuf::from(format!("/opt/{name}/{name}.jar")),
                working_directory: None,
                arguments: Vec::new(),
                environment: Vec::new(),
                start_order: 0,
                active: true,
            },
        }
    }

    pub fn jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.worker.executable_path = path.into();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.worker.working_directory = Some(dir.into());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.worker.arguments.push(arg.to_string());
        self
    }

    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.worker.environment.push(EnvVariable::new(name, value));
        self
    }

    pub fn order(mut self, start_order: u8) -> Self {
        self.worker.start_order = start_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.worker.active = false;
        self
    }

    pub fn build(self) -> WorkerDescriptor {
        self.worker
    }
}
