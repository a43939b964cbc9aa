// src/config/source.rs

//! Where the supervisor gets its worker catalog from.
//!
//! The supervisor never caches descriptors: it asks its [`CatalogSource`]
//! for a fresh snapshot on every call, so edits to `Jac.toml` take effect
//! without a restart.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Result, anyhow};

use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;

pub trait CatalogSource: Send + Sync + Debug {
    fn load(&self) -> Result<ConfigFile>;
}

/// Re-reads and validates a TOML file on every call.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<ConfigFile> {
        load_and_validate(&self.path)
    }
}

/// In-memory catalog, replaceable at runtime.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    inner: Arc<RwLock<ConfigFile>>,
}

impl StaticCatalog {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn replace(&self, config: ConfigFile) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

impl CatalogSource for StaticCatalog {
    fn load(&self) -> Result<ConfigFile> {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| anyhow!("catalog lock poisoned"))
    }
}
