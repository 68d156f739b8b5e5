// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{AssetsMode, BuilderKind};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// src = "spec"
/// out = "docs"
///
/// [build]
/// assets = "external"
///
/// [watch]
/// recursive = true
/// exclude = ["**/*.swp"]
///
/// [server]
/// port = 8080
/// ```
///
/// All sections are optional and have defaults matching a `src/` + `docs/`
/// project layout. This is the unvalidated form; see [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[paths]` section. Relative paths are resolved against the base directory
/// (the config file's directory).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    /// Directory that is watched and holds the entry document.
    #[serde(default = "default_src")]
    pub src: PathBuf,

    /// Directory the rendered document is written to and served from.
    #[serde(default = "default_out")]
    pub out: PathBuf,

    /// Top-level document, relative to `src`.
    #[serde(default = "default_document")]
    pub entry: PathBuf,

    /// Rendered document, relative to `out`.
    #[serde(default = "default_document")]
    pub output: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_out() -> PathBuf {
    PathBuf::from("docs")
}

fn default_document() -> PathBuf {
    PathBuf::from("index.html")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            out: default_out(),
            entry: default_document(),
            output: default_document(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// `"imports"` (default) or `"command"`.
    #[serde(default)]
    pub builder: BuilderKind,

    /// Command template for the `command` builder.
    #[serde(default)]
    pub cmd: Option<String>,

    /// `"none"` (default), `"inline"` or `"external"`.
    #[serde(default)]
    pub assets: AssetsMode,

    /// Generated style sheet, relative to `out`.
    #[serde(default = "default_css_out")]
    pub css_out: Option<PathBuf>,

    /// Generated script, relative to `out`.
    #[serde(default = "default_js_out")]
    pub js_out: Option<PathBuf>,

    /// Skip rebuilds when the source tree is byte-identical to the last
    /// successful build.
    #[serde(default)]
    pub skip_unchanged: bool,
}

fn default_css_out() -> Option<PathBuf> {
    Some(PathBuf::from("ecmarkup.css"))
}

fn default_js_out() -> Option<PathBuf> {
    Some(PathBuf::from("ecmarkup.js"))
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            builder: BuilderKind::default(),
            cmd: None,
            assets: AssetsMode::default(),
            css_out: default_css_out(),
            js_out: default_js_out(),
            skip_unchanged: false,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Watch subdirectories of `src` as well.
    #[serde(default)]
    pub recursive: bool,

    /// Globs (relative to `src`) whose changes never trigger a rebuild.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Favicon file, relative to `out`.
    #[serde(default = "default_favicon")]
    pub favicon: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_favicon() -> PathBuf {
    PathBuf::from("icon.ico")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            favicon: default_favicon(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, which runs
/// the checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    paths: PathsSection,
    build: BuildSection,
    watch: WatchSection,
    server: ServerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            build: raw.build,
            watch: raw.watch,
            server: raw.server,
        }
    }

    pub fn paths(&self) -> &PathsSection {
        &self.paths
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    /// Absolute locations of everything the process touches.
    pub fn resolve_paths(&self, base: &Path) -> ProjectPaths {
        ProjectPaths::new(base, &self.paths, &self.build, &self.server)
    }
}

/// Absolute paths derived from the configuration and a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub src: PathBuf,
    pub out: PathBuf,
    pub entry: PathBuf,
    pub output: PathBuf,
    pub css_out: Option<PathBuf>,
    pub js_out: Option<PathBuf>,
    pub favicon: PathBuf,
}

impl ProjectPaths {
    pub fn new(
        base: &Path,
        paths: &PathsSection,
        build: &BuildSection,
        server: &ServerSection,
    ) -> Self {
        let src = base.join(&paths.src);
        let out = base.join(&paths.out);
        Self {
            entry: src.join(&paths.entry),
            output: out.join(&paths.output),
            css_out: build.css_out.as_ref().map(|p| out.join(p)),
            js_out: build.js_out.as_ref().map(|p| out.join(p)),
            favicon: out.join(&server.favicon),
            src,
            out,
        }
    }
}
