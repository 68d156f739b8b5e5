#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use specwatch::config::{ConfigFile, RawConfigFile};
use specwatch::types::{AssetsMode, BuilderKind};
use tempfile::TempDir;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_src(mut self, src: impl Into<PathBuf>) -> Self {
        self.config.paths.src = src.into();
        self
    }

    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.config.paths.out = out.into();
        self
    }

    pub fn with_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.config.paths.entry = entry.into();
        self
    }

    pub fn with_command(mut self, cmd: &str) -> Self {
        self.config.build.builder = BuilderKind::Command;
        self.config.build.cmd = Some(cmd.to_string());
        self
    }

    pub fn with_assets(mut self, assets: AssetsMode) -> Self {
        self.config.build.assets = assets;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.watch.recursive = recursive;
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary project with `src/` and `docs/` directories.
///
/// The directory is removed when the value is dropped.
pub struct ProjectDir {
    dir: TempDir,
}

impl ProjectDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("create src dir");
        fs::create_dir_all(dir.path().join("docs")).expect("create docs dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn out(&self) -> PathBuf {
        self.root().join("docs")
    }

    pub fn write_src(&self, name: &str, contents: &str) -> PathBuf {
        write(&self.src().join(name), contents)
    }

    pub fn write_out(&self, name: &str, contents: &str) -> PathBuf {
        write(&self.out().join(name), contents)
    }

    pub fn read_out(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.out().join(name)).ok()
    }

    /// Write `Specwatch.toml` into the project root and return its path.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        write(&self.root().join("Specwatch.toml"), contents)
    }
}

impl Default for ProjectDir {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
    path.to_path_buf()
}
