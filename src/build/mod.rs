// src/build/mod.rs

//! Document builders.
//!
//! The rest of the crate only sees the [`DocumentBuilder`] capability: given
//! the entry document, a [`Fetch`] callback and [`BuildOptions`], produce an
//! in-memory [`Document`]. Two implementations exist:
//!
//! - [`imports::ImportBuilder`] expands `<emu-import>` elements through the
//!   fetch callback and emits the bundled style sheet and script.
//! - [`command::CommandBuilder`] runs an external renderer and takes its
//!   stdout as the document.

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::errors::{BuildError, ResolveError};
use crate::types::AssetsMode;

pub mod command;
pub mod imports;

pub use command::CommandBuilder;
pub use imports::ImportBuilder;

/// Callback a builder uses to obtain the content of a referenced file.
pub trait Fetch: Send + Sync {
    fn fetch(&self, name: &str) -> Result<String, ResolveError>;
}

/// Fixed per-process builder configuration.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub assets: AssetsMode,
    /// Where the generated style sheet should end up.
    pub css_out: Option<PathBuf>,
    /// Where the generated script should end up.
    pub js_out: Option<PathBuf>,
}

/// A file produced alongside the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    pub path: PathBuf,
    pub contents: String,
}

/// Rendered document held in memory for the duration of one rebuild.
#[derive(Debug, Clone, Default)]
pub struct Document {
    html: String,
    assets: Vec<GeneratedAsset>,
}

impl Document {
    pub fn new(html: impl Into<String>, assets: Vec<GeneratedAsset>) -> Self {
        Self {
            html: html.into(),
            assets,
        }
    }

    /// Textual form of the document, as written to the output file.
    pub fn to_html(&self) -> &str {
        &self.html
    }

    pub fn assets(&self) -> &[GeneratedAsset] {
        &self.assets
    }
}

pub type BuildFuture<'a> = Pin<Box<dyn Future<Output = Result<Document, BuildError>> + Send + 'a>>;

/// Capability that renders the entry document.
pub trait DocumentBuilder: Send + Sync + Debug {
    /// Render `entry` (an absolute path), fetching every file through `fetch`.
    fn build<'a>(
        &'a self,
        entry: &'a Path,
        fetch: &'a dyn Fetch,
        options: &'a BuildOptions,
    ) -> BuildFuture<'a>;
}
