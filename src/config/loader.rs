// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Specwatch.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the raw config for a run.
///
/// - An explicit path must exist.
/// - Without one, `Specwatch.toml` in the working directory is used when
///   present; otherwise every setting takes its default.
///
/// Returns the config together with the path it came from, if any.
pub fn load_or_default(explicit: Option<&Path>) -> Result<(RawConfigFile, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((load_from_path(path)?, Some(path.to_path_buf())));
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        debug!(path = ?fallback, "using default config file");
        return Ok((load_from_path(&fallback)?, Some(fallback)));
    }

    debug!("no config file; using defaults");
    Ok((RawConfigFile::default(), None))
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Make `[paths].src` and `[paths].out` absolute against `base`.
///
/// Entry, output and asset paths stay relative to these two.
pub fn anchor_paths(raw: &mut RawConfigFile, base: &Path) {
    raw.paths.src = base.join(&raw.paths.src);
    raw.paths.out = base.join(&raw.paths.out);
}

/// Directory that relative config paths are resolved against: the config
/// file's directory, or the working directory without a config file.
pub fn config_base_dir(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::path::absolute(parent)?),
        _ => Ok(std::env::current_dir()?),
    }
}
