// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SpecwatchError};
use crate::fs::normalize_lexically;
use crate::types::BuilderKind;
use crate::watch::ExcludeSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SpecwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_build(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> SpecwatchError {
    SpecwatchError::ConfigError(msg.into())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let paths = &cfg.paths;

    if paths.entry.as_os_str().is_empty() {
        return Err(config_error("[paths].entry must not be empty"));
    }
    if paths.output.as_os_str().is_empty() {
        return Err(config_error("[paths].output must not be empty"));
    }

    let src = normalize_lexically(&paths.src);
    let out = normalize_lexically(&paths.out);
    if src == out {
        return Err(config_error(format!(
            "[paths].src and [paths].out must differ (both {:?})",
            paths.src
        )));
    }

    if cfg.watch.recursive && out.starts_with(&src) {
        return Err(config_error(format!(
            "[paths].out {:?} is inside [paths].src {:?}; a recursive watch would rebuild on its own output",
            paths.out, paths.src
        )));
    }

    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.builder == BuilderKind::Command {
        let has_cmd = cfg
            .build
            .cmd
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if !has_cmd {
            return Err(config_error(
                "[build].builder = \"command\" requires a non-empty [build].cmd",
            ));
        }
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    ExcludeSet::new(&cfg.watch.exclude)
        .map_err(|e| config_error(format!("[watch].exclude: {e:#}")))?;
    Ok(())
}
