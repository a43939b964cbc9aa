// src/config/mod.rs

//! Configuration loading and validation for jac.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate worker names and settings (`validate.rs`).
//! - Hand fresh snapshots to the supervisor (`source.rs`).

pub mod loader;
pub mod model;
pub mod source;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, EnvVariable, Settings, WorkerDescriptor, log_file_name};
pub use source::{CatalogSource, FileCatalog, StaticCatalog};
pub use validate::validate_config;
