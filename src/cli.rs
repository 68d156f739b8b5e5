// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::{AssetsMode, BuilderKind};

/// Command-line arguments for `specwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "specwatch",
    version,
    about = "Rebuild a spec document on source changes and serve the output directory.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Specwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source directory (overrides `[paths].src`).
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Output directory (overrides `[paths].out`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Address to listen on (overrides `[server].host`).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides `[server].port`).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Document builder: imports or command (overrides `[build].builder`).
    #[arg(long, value_name = "KIND")]
    pub builder: Option<BuilderKind>,

    /// Asset mode: none, inline or external (overrides `[build].assets`).
    #[arg(long, value_name = "MODE")]
    pub assets: Option<AssetsMode>,

    /// Build once and exit; no watching, no serving.
    #[arg(long)]
    pub once: bool,

    /// Watch and rebuild, but don't start the HTTP server.
    #[arg(long)]
    pub no_serve: bool,

    /// Parse + validate, print the resolved settings, but don't build.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SPECWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Apply flag overrides to a loaded config.
    ///
    /// Paths given on the command line are made absolute against the current
    /// working directory.
    pub fn apply_overrides(&self, raw: &mut RawConfigFile) -> Result<()> {
        if let Some(src) = &self.src {
            raw.paths.src = std::path::absolute(src)
                .with_context(|| format!("resolving --src {src:?}"))?;
        }
        if let Some(out) = &self.out {
            raw.paths.out = std::path::absolute(out)
                .with_context(|| format!("resolving --out {out:?}"))?;
        }
        if let Some(host) = &self.host {
            raw.server.host = host.clone();
        }
        if let Some(port) = self.port {
            raw.server.port = port;
        }
        if let Some(builder) = self.builder {
            raw.build.builder = builder;
        }
        if let Some(assets) = self.assets {
            raw.build.assets = assets;
        }
        Ok(())
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
