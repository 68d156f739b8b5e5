// src/rebuild/mod.rs

//! One rebuild: render the entry document and persist the result.
//!
//! - [`Rebuilder`] owns everything a rebuild needs (builder, resolver,
//!   output locations) and is shared across rebuilds behind an `Arc`.
//! - [`backend`] provides the `RebuildBackend` trait the runtime talks to and
//!   the production `RealRebuildBackend`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::build::{BuildOptions, Document, DocumentBuilder};
use crate::engine::{RebuildOutcome, TriggerReason};
use crate::errors::{RebuildError, error_chain};
use crate::fs::FileSystem;
use crate::resolve::Resolver;
use crate::watch::compute_tree_hash;

pub mod backend;

pub use backend::{RealRebuildBackend, RebuildBackend};

/// Everything needed to run a rebuild.
#[derive(Debug)]
pub struct Rebuilder {
    builder: Arc<dyn DocumentBuilder>,
    resolver: Resolver,
    fs: Arc<dyn FileSystem>,
    /// Absolute path of the top-level source document.
    entry: PathBuf,
    /// Absolute path the rendered document is written to.
    output: PathBuf,
    options: BuildOptions,
    /// When set, skip rebuilds whose source tree digest matches the last
    /// successful one. Holds the directory to hash.
    skip_unchanged_root: Option<PathBuf>,
    last_digest: Mutex<Option<String>>,
}

impl Rebuilder {
    pub fn new(
        builder: Arc<dyn DocumentBuilder>,
        resolver: Resolver,
        fs: Arc<dyn FileSystem>,
        entry: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        options: BuildOptions,
    ) -> Self {
        Self {
            builder,
            resolver,
            fs,
            entry: entry.into(),
            output: output.into(),
            options,
            skip_unchanged_root: None,
            last_digest: Mutex::new(None),
        }
    }

    /// Skip rebuilds while the tree below `source_root` is unchanged.
    pub fn skip_unchanged(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.skip_unchanged_root = Some(source_root.into());
        self
    }

    pub fn entry(&self) -> &Path {
        &self.entry
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Resolver the builder reads through.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Rebuild and log the result. Never fails; the outcome is reported
    /// instead.
    pub async fn run(&self, reason: TriggerReason) -> RebuildOutcome {
        info!(?reason, entry = ?self.entry, "building");
        let started = Instant::now();

        match self.rebuild().await {
            Ok(RebuildOutcome::Skipped) => {
                info!("sources unchanged since last build; skipped");
                RebuildOutcome::Skipped
            }
            Ok(outcome) => {
                info!(
                    output = ?self.output,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "build finished"
                );
                outcome
            }
            Err(err) => {
                error!(error = %error_chain(&err), "build failed; keeping previous output");
                RebuildOutcome::Failed
            }
        }
    }

    /// Render the entry document and write it (and its assets) to disk.
    ///
    /// Nothing is written unless the builder succeeds. Assets are written
    /// before the document.
    pub async fn rebuild(&self) -> Result<RebuildOutcome, RebuildError> {
        let digest = self.current_digest();
        if let Some(digest) = &digest {
            if self.unchanged(digest) {
                return Ok(RebuildOutcome::Skipped);
            }
        }

        let document = self
            .builder
            .build(&self.entry, &self.resolver, &self.options)
            .await?;

        self.persist(&document)?;

        if let Some(digest) = digest {
            *self.last_digest.lock().unwrap_or_else(|p| p.into_inner()) = Some(digest);
        }

        Ok(RebuildOutcome::Succeeded)
    }

    fn persist(&self, document: &Document) -> Result<(), RebuildError> {
        for asset in document.assets() {
            debug!(path = ?asset.path, bytes = asset.contents.len(), "writing asset");
            self.write(&asset.path, asset.contents.as_bytes())?;
        }

        let html = document.to_html();
        debug!(path = ?self.output, bytes = html.len(), "writing document");
        self.write(&self.output, html.as_bytes())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), RebuildError> {
        self.fs
            .write(path, contents)
            .map_err(|err| RebuildError::Write {
                path: path.to_path_buf(),
                source: err.into(),
            })
    }

    fn current_digest(&self) -> Option<String> {
        let root = self.skip_unchanged_root.as_ref()?;
        match compute_tree_hash(self.fs.as_ref(), root) {
            Ok(digest) => Some(digest),
            Err(err) => {
                warn!(error = %err, "failed to hash sources; rebuilding anyway");
                None
            }
        }
    }

    fn unchanged(&self, digest: &str) -> bool {
        let last = self.last_digest.lock().unwrap_or_else(|p| p.into_inner());
        last.as_deref() == Some(digest) && self.fs.exists(&self.output)
    }
}
