use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How generated style sheet and script relate to the rendered document.
///
/// - `None`: the document is left untouched; assets are only written to their
///   configured output paths.
/// - `External`: like `None`, plus `<link>`/`<script>` tags pointing at the
///   written assets.
/// - `Inline`: assets are embedded in the document and not written separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetsMode {
    #[default]
    None,
    Inline,
    External,
}

impl AssetsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetsMode::None => "none",
            AssetsMode::Inline => "inline",
            AssetsMode::External => "external",
        }
    }
}

impl fmt::Display for AssetsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(AssetsMode::None),
            "inline" => Ok(AssetsMode::Inline),
            "external" => Ok(AssetsMode::External),
            other => Err(format!(
                "invalid assets mode: {other} (expected \"none\", \"inline\" or \"external\")"
            )),
        }
    }
}

/// Which document builder renders the entry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuilderKind {
    /// Built-in builder that expands `<emu-import>` elements.
    #[default]
    Imports,
    /// External command whose stdout is the rendered document.
    Command,
}

impl FromStr for BuilderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imports" => Ok(BuilderKind::Imports),
            "command" => Ok(BuilderKind::Command),
            other => Err(format!(
                "invalid builder: {other} (expected \"imports\" or \"command\")"
            )),
        }
    }
}
