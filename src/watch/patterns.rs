// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `[watch].exclude` globs.
///
/// Patterns are relative to the watched source directory; the watcher passes
/// relative paths with forward slashes (e.g. `"sections/.intro.html.swp"`).
/// An empty set excludes nothing.
#[derive(Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("patterns", &self.patterns)
            .finish()
    }
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }

        Ok(Self {
            patterns: patterns.to_vec(),
            set: Some(builder.build()?),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    /// Whether `rel_path` (relative to the watch root) is excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(rel_path),
            None => false,
        }
    }

    /// Whether `path` is excluded, given the watch `root`.
    ///
    /// Paths outside `root` are never excluded.
    pub fn matches_path(&self, root: &Path, path: &Path) -> bool {
        match relative_str(root, path) {
            Some(rel) => self.matches(&rel),
            None => false,
        }
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
