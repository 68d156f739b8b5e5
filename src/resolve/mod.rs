// src/resolve/mod.rs

//! File lookup for the document builder.
//!
//! A [`Resolver`] holds an ordered list of [`Source`]s and returns the content
//! of the first one that can read a given name. The default order is the
//! output directory (previously generated assets stay byte-identical) and then
//! the source directory (files that were never generated).
//!
//! Nothing is cached; every lookup re-reads from disk.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::build::Fetch;
use crate::errors::{BoxError, ResolveError};
use crate::fs::{FileSystem, is_not_found};

/// What a source directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Previously generated output.
    Output,
    /// Hand-written sources.
    Source,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Output => f.write_str("output"),
            SourceKind::Source => f.write_str("source"),
        }
    }
}

/// A directory the resolver may read from.
#[derive(Debug, Clone)]
pub struct Source {
    pub kind: SourceKind,
    pub root: PathBuf,
}

impl Source {
    pub fn new(kind: SourceKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
        }
    }

    /// Location of `name` inside this source.
    ///
    /// `Path::join` keeps absolute names as they are.
    pub fn locate(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Ordered multi-directory file lookup.
#[derive(Debug, Clone)]
pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    sources: Vec<Source>,
}

impl Resolver {
    /// Output directory first, then source directory.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        out_dir: impl Into<PathBuf>,
        src_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::with_sources(
            fs,
            vec![
                Source::new(SourceKind::Output, out_dir),
                Source::new(SourceKind::Source, src_dir),
            ],
        )
    }

    pub fn with_sources(fs: Arc<dyn FileSystem>, sources: Vec<Source>) -> Self {
        Self { fs, sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Return the content of `name` from the first source that can read it.
    ///
    /// Every failure of an earlier source falls through to the next one,
    /// whatever its kind. If all sources fail, the error of the last one is
    /// carried in [`ResolveError::NotFound`].
    pub fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        let mut tried = Vec::with_capacity(self.sources.len());
        let mut last_err: Option<anyhow::Error> = None;

        for source in &self.sources {
            let path = source.locate(name);
            match self.fs.read_to_string(&path) {
                Ok(content) => {
                    debug!(name, source = %source.kind, path = ?path, "resolved file");
                    return Ok(content);
                }
                Err(err) => {
                    if is_not_found(&err) {
                        debug!(name, source = %source.kind, "not present in source");
                    } else {
                        warn!(
                            name,
                            source = %source.kind,
                            error = %err,
                            "read failed, falling back to next source"
                        );
                    }
                    tried.push(path);
                    last_err = Some(err);
                }
            }
        }

        let source: BoxError = match last_err {
            Some(err) => err.into(),
            None => "no sources configured".into(),
        };

        Err(ResolveError::NotFound {
            name: name.to_string(),
            tried,
            source,
        })
    }
}

impl Fetch for Resolver {
    fn fetch(&self, name: &str) -> Result<String, ResolveError> {
        self.resolve(name)
    }
}
