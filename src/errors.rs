// src/errors.rs

//! Crate-wide error types.
//!
//! - [`SpecwatchError`] is what start-up code and `run` return.
//! - [`ResolveError`], [`BuildError`] and [`RebuildError`] describe the
//!   failures of a single rebuild. They are caught at the rebuild boundary
//!   and logged; they never stop the watcher.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Boxed error used where the underlying failure comes from the `anyhow`-based
/// filesystem layer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SpecwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{0} rebuild(s) failed")]
    RebuildFailed(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// No source could produce the requested file.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{name:?} not found (tried {tried:?})")]
    NotFound {
        name: String,
        tried: Vec<PathBuf>,
        /// Failure of the last source that was tried.
        #[source]
        source: BoxError,
    },
}

impl ResolveError {
    pub fn name(&self) -> &str {
        match self {
            ResolveError::NotFound { name, .. } => name,
        }
    }
}

/// The document builder could not produce a document.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to fetch {name:?}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: ResolveError,
    },

    #[error("import cycle: {}", chain.join(" -> "))]
    ImportCycle { chain: Vec<String> },

    #[error("failed to spawn build command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for build command: {0}")]
    Wait(#[source] std::io::Error),

    #[error("build command exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("build output is not valid UTF-8: {0}")]
    InvalidOutput(#[from] FromUtf8Error),
}

/// A rebuild failed; the previous output is left in place.
#[derive(Error, Debug)]
pub enum RebuildError {
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// `err` followed by its causes, joined with `: `.
///
/// Causes whose text already appears in the message are skipped.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SpecwatchError>;
