// src/build/command.rs

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::BuildError;

use super::{BuildFuture, BuildOptions, Document, DocumentBuilder, Fetch};

/// How many trailing stderr lines end up in [`BuildError::CommandFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// Builder that delegates rendering to an external command.
///
/// The command template may contain `{entry}`, `{css_out}`, `{js_out}` and
/// `{assets}` placeholders; they are substituted (shell-quoted) before the
/// command is run through `sh -c` (`cmd /C` on Windows). Whatever the command
/// prints on stdout is the rendered document.
///
/// The external renderer reads its inputs and writes its own assets, so the
/// fetch callback is not consulted and the document carries no assets.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    template: String,
}

impl CommandBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The shell command line for this entry and options.
    pub fn command_line(&self, entry: &Path, options: &BuildOptions) -> String {
        let path_arg = |p: Option<&Path>| match p {
            Some(p) => shell_quote(&p.to_string_lossy()),
            None => String::new(),
        };

        self.template
            .replace("{entry}", &path_arg(Some(entry)))
            .replace("{css_out}", &path_arg(options.css_out.as_deref()))
            .replace("{js_out}", &path_arg(options.js_out.as_deref()))
            .replace("{assets}", options.assets.as_str())
    }

    async fn run(&self, entry: &Path, options: &BuildOptions) -> Result<Document, BuildError> {
        let line = self.command_line(entry, options);
        info!(cmd = %line, "running build command");

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&line);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&line);
            c
        };

        if let Some(dir) = entry.parent() {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(BuildError::Spawn)?;
        let output = child.wait_with_output().await.map_err(BuildError::Wait)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            debug!("build stderr: {}", line);
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(BuildError::CommandFailed { code, stderr: tail });
        }

        let html = String::from_utf8(output.stdout)?;
        Ok(Document::new(html, Vec::new()))
    }
}

impl DocumentBuilder for CommandBuilder {
    fn build<'a>(
        &'a self,
        entry: &'a Path,
        _fetch: &'a dyn Fetch,
        options: &'a BuildOptions,
    ) -> BuildFuture<'a> {
        Box::pin(self.run(entry, options))
    }
}

/// Quote `s` for the platform shell unless it only contains safe characters.
fn shell_quote(s: &str) -> String {
    let safe = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '\\'));
    if safe && !s.is_empty() {
        return s.to_string();
    }

    if cfg!(windows) {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
