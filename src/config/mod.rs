// src/config/mod.rs

//! Configuration loading and validation for specwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate basic invariants like distinct source/output dirs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    anchor_paths, config_base_dir, load_and_validate, load_from_path, load_or_default,
};
pub use model::{
    BuildSection, ConfigFile, PathsSection, ProjectPaths, RawConfigFile, ServerSection,
    WatchSection,
};
