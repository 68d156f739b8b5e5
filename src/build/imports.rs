// src/build/imports.rs

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::BuildError;
use crate::fs::normalize_lexically;
use crate::types::AssetsMode;

use super::{BuildFuture, BuildOptions, Document, DocumentBuilder, Fetch, GeneratedAsset};

/// Style sheet shipped with the built-in builder.
pub const BUNDLED_STYLESHEET: &str = include_str!("../../assets/spec.css");

/// Script shipped with the built-in builder.
pub const BUNDLED_SCRIPT: &str = include_str!("../../assets/spec.js");

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<emu-import((?:\s[^>]*?)?)\s*(?:/>|>\s*</emu-import\s*>)")
        .expect("import pattern is valid")
});

/// `href` in any attribute position, double-, single- or unquoted.
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("href pattern is valid")
});

static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head pattern is valid"));

/// Built-in builder: inlines `<emu-import href="…">` elements.
///
/// The entry is fetched by its own (absolute) name. Imports are resolved
/// relative to the directory of the importing file and requested from the
/// fetch callback by names relative to the entry's directory, so a generated
/// copy in the output directory can shadow the source. Expansion is
/// recursive. The imported content replaces the element's (empty)
/// body, so the element and its attributes stay in the document:
///
/// ```text
/// <emu-import id="intro" href='intro.html' />
///   => <emu-import id="intro" href='intro.html'>…content of intro.html…</emu-import>
/// ```
///
/// Elements without an `href` are left untouched.
#[derive(Debug, Clone)]
pub struct ImportBuilder {
    stylesheet: String,
    script: String,
}

impl Default for ImportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportBuilder {
    pub fn new() -> Self {
        Self::with_assets(BUNDLED_STYLESHEET, BUNDLED_SCRIPT)
    }

    /// Use a custom style sheet and script instead of the bundled ones.
    pub fn with_assets(stylesheet: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            script: script.into(),
        }
    }

    /// Render synchronously. [`DocumentBuilder::build`] wraps this.
    pub fn render(
        &self,
        entry: &Path,
        fetch: &dyn Fetch,
        options: &BuildOptions,
    ) -> Result<Document, BuildError> {
        let entry_name = normalize_lexically(entry).to_string_lossy().into_owned();
        let mut stack = Vec::new();
        let body = self.expand(&entry_name, Path::new(""), fetch, &mut stack)?;

        let html = match options.assets {
            AssetsMode::None => body,
            AssetsMode::External => insert_before_head_close(&body, &external_tags(options)),
            AssetsMode::Inline => {
                let tags = format!(
                    "<style>{}</style>\n<script>{}</script>\n",
                    self.stylesheet, self.script
                );
                insert_before_head_close(&body, &tags)
            }
        };

        let mut assets = Vec::new();
        if options.assets != AssetsMode::Inline {
            if let Some(path) = &options.css_out {
                assets.push(GeneratedAsset {
                    path: path.clone(),
                    contents: self.stylesheet.clone(),
                });
            }
            if let Some(path) = &options.js_out {
                assets.push(GeneratedAsset {
                    path: path.clone(),
                    contents: self.script.clone(),
                });
            }
        }

        Ok(Document::new(html, assets))
    }

    /// Fetch `name` and expand its imports. `base` is the importing file's
    /// directory relative to the entry's directory.
    fn expand(
        &self,
        name: &str,
        base: &Path,
        fetch: &dyn Fetch,
        stack: &mut Vec<String>,
    ) -> Result<String, BuildError> {
        if stack.iter().any(|seen| seen == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(BuildError::ImportCycle { chain });
        }

        let content = fetch.fetch(name).map_err(|source| BuildError::Fetch {
            name: name.to_string(),
            source,
        })?;

        stack.push(name.to_string());

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for caps in IMPORT_RE.captures_iter(&content) {
            let Some(whole) = caps.get(0) else { continue };
            let attrs = &caps[1];
            let Some(href) = href_of(attrs) else {
                warn!(file = name, "emu-import without href left as is");
                continue;
            };
            let child = normalize_lexically(&base.join(href));
            let child_base = child.parent().unwrap_or(Path::new("")).to_path_buf();
            let child = child.to_string_lossy().into_owned();

            debug!(parent = name, import = %child, "expanding import");
            let expanded = self.expand(&child, &child_base, fetch, stack)?;

            out.push_str(&content[last..whole.start()]);
            out.push_str("<emu-import");
            out.push_str(attrs);
            out.push('>');
            out.push_str(&expanded);
            out.push_str("</emu-import>");
            last = whole.end();
        }
        out.push_str(&content[last..]);

        stack.pop();
        Ok(out)
    }
}

impl DocumentBuilder for ImportBuilder {
    fn build<'a>(
        &'a self,
        entry: &'a Path,
        fetch: &'a dyn Fetch,
        options: &'a BuildOptions,
    ) -> BuildFuture<'a> {
        Box::pin(async move { self.render(entry, fetch, options) })
    }
}

fn href_of(attrs: &str) -> Option<&str> {
    let caps = HREF_RE.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// `<link>`/`<script>` tags referring to the written assets by file name.
fn external_tags(options: &BuildOptions) -> String {
    let mut tags = String::new();
    if let Some(name) = options.css_out.as_deref().and_then(file_name) {
        tags.push_str(&format!("<link rel=\"stylesheet\" href=\"{name}\">\n"));
    }
    if let Some(name) = options.js_out.as_deref().and_then(file_name) {
        tags.push_str(&format!("<script src=\"{name}\" defer></script>\n"));
    }
    tags
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Insert `tags` before the first `</head>`, or prepend them if there is none.
fn insert_before_head_close(html: &str, tags: &str) -> String {
    match HEAD_CLOSE_RE.find(html) {
        Some(m) => {
            let mut out = String::with_capacity(html.len() + tags.len());
            out.push_str(&html[..m.start()]);
            out.push_str(tags);
            out.push_str(&html[m.start()..]);
            out
        }
        None => format!("{tags}{html}"),
    }
}
