// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod rebuild;
pub mod resolve;
pub mod server;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::build::{BuildOptions, CommandBuilder, DocumentBuilder, ImportBuilder};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, ProjectPaths, anchor_paths, config_base_dir, load_or_default};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::SpecwatchError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::rebuild::{RealRebuildBackend, Rebuilder};
use crate::resolve::Resolver;
use crate::server::{Server, ServerOptions};
use crate::types::BuilderKind;
use crate::watch::ExcludeSet;

/// Validated configuration with CLI overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: ConfigFile,
    pub paths: ProjectPaths,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Load the config file (or defaults), apply CLI overrides and validate.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let (mut raw, config_path) = load_or_default(args.config.as_deref())?;
        let base = config_base_dir(config_path.as_deref())?;

        anchor_paths(&mut raw, &base);
        args.apply_overrides(&mut raw)?;

        let config = ConfigFile::try_from(raw)?;
        let paths = config.resolve_paths(&base);
        debug!(?paths, "resolved project paths");

        Ok(Self {
            config,
            paths,
            config_path,
        })
    }

    /// Directories the watcher must cover.
    ///
    /// The source directory, plus the entry's directory when the entry sits
    /// in a subdirectory a non-recursive watch would miss.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.paths.src.clone()];
        if let Some(entry_dir) = self.paths.entry.parent() {
            let covered = entry_dir == self.paths.src
                || (self.config.watch().recursive && entry_dir.starts_with(&self.paths.src));
            if !covered {
                roots.push(entry_dir.to_path_buf());
            }
        }
        roots
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            assets: self.config.build().assets,
            css_out: self.paths.css_out.clone(),
            js_out: self.paths.js_out.clone(),
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            host: self.config.server().host.clone(),
            port: self.config.server().port,
            root: self.paths.out.clone(),
            favicon: self.paths.favicon.clone(),
        }
    }

    /// The configured document builder.
    pub fn document_builder(&self) -> Arc<dyn DocumentBuilder> {
        match self.config.build().builder {
            BuilderKind::Imports => Arc::new(ImportBuilder::new()),
            BuilderKind::Command => Arc::new(CommandBuilder::new(
                self.config.build().cmd.clone().unwrap_or_default(),
            )),
        }
    }

    /// Rebuilder reading through `fs`: output directory first, then sources.
    ///
    /// Import names are relative to the entry's directory, so that directory
    /// is the source root the resolver falls back to.
    pub fn rebuilder(&self, fs: Arc<dyn FileSystem>) -> Rebuilder {
        let source_root = self.paths.entry.parent().unwrap_or(&self.paths.src);
        let resolver = Resolver::new(Arc::clone(&fs), &self.paths.out, source_root);
        let rebuilder = Rebuilder::new(
            self.document_builder(),
            resolver,
            fs,
            &self.paths.entry,
            &self.paths.output,
            self.build_options(),
        );

        if self.config.build().skip_unchanged {
            rebuilder.skip_unchanged(&self.paths.src)
        } else {
            rebuilder
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - rebuilder / runtime
/// - (optional) file watcher and HTTP server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = Settings::load(&args)?;

    if args.dry_run {
        print_dry_run(&settings, &args);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let rebuilder = Arc::new(settings.rebuilder(fs));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let backend = RealRebuildBackend::new(Arc::clone(&rebuilder), rt_tx.clone());

    if args.once {
        rt_tx
            .send(RuntimeEvent::RebuildRequested {
                reason: TriggerReason::Startup,
            })
            .await?;

        let core = CoreRuntime::new(RuntimeOptions {
            exit_when_idle: true,
        });
        let summary = Runtime::new(core, rt_rx, backend).run().await?;
        if summary.failed > 0 {
            return Err(SpecwatchError::RebuildFailed(summary.failed).into());
        }
        return Ok(());
    }

    // Bind before the first rebuild so a busy port is fatal right away.
    let server = if args.no_serve {
        None
    } else {
        Some(Server::bind(&settings.server_options()).await?)
    };

    let excludes = ExcludeSet::new(&settings.config.watch().exclude)?;
    let mut watchers = Vec::new();
    for root in settings.watch_roots() {
        let handle = crate::watch::spawn_watcher(
            &root,
            settings.config.watch().recursive,
            excludes.clone(),
            rt_tx.clone(),
        )
        .with_context(|| format!("watching {root:?}"))?;
        watchers.push(handle);
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let server_task = server.map(|server| tokio::spawn(server.run(shutdown_rx)));

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await?;

    let core = CoreRuntime::new(RuntimeOptions::default());
    let result = Runtime::new(core, rt_rx, backend).run().await;

    let _ = shutdown_tx.send(true);
    if let Some(task) = server_task {
        task.await.context("HTTP server task panicked")??;
    }

    let summary = result?;
    info!(?summary, "specwatch stopped");
    Ok(())
}

/// Print the effective settings without building anything.
fn print_dry_run(settings: &Settings, args: &CliArgs) {
    let cfg = &settings.config;
    let paths = &settings.paths;

    println!("specwatch dry-run");
    match &settings.config_path {
        Some(path) => println!("  config: {}", path.display()),
        None => println!("  config: (defaults)"),
    }
    println!();

    println!("paths:");
    println!("  src: {}", paths.src.display());
    println!("  out: {}", paths.out.display());
    println!("  entry: {}", paths.entry.display());
    println!("  output: {}", paths.output.display());
    println!();

    println!("build:");
    match cfg.build().builder {
        BuilderKind::Imports => println!("  builder: imports"),
        BuilderKind::Command => {
            println!("  builder: command");
            if let Some(cmd) = &cfg.build().cmd {
                println!("  cmd: {cmd}");
            }
        }
    }
    println!("  assets: {}", cfg.build().assets);
    if let Some(css) = &paths.css_out {
        println!("  css_out: {}", css.display());
    }
    if let Some(js) = &paths.js_out {
        println!("  js_out: {}", js.display());
    }
    if cfg.build().skip_unchanged {
        println!("  skip_unchanged: true");
    }
    println!();

    println!("watch:");
    println!("  recursive: {}", cfg.watch().recursive);
    if !cfg.watch().exclude.is_empty() {
        println!("  exclude: {:?}", cfg.watch().exclude);
    }
    println!();

    if args.once || args.no_serve {
        println!("server: disabled");
    } else {
        println!("server:");
        println!("  listen: {}:{}", cfg.server().host, cfg.server().port);
        println!("  favicon: {}", paths.favicon.display());
    }

    debug!("dry-run complete (no build)");
}
