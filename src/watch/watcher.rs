// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::patterns::ExcludeSet;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Whether a notify event describes a change to the watched tree.
///
/// Access events (a file being opened or read) are not changes; the rebuild
/// itself reads the sources and must not re-trigger.
pub fn is_change(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Spawn a filesystem watcher on the source directory that sends
/// `RuntimeEvent::RebuildRequested` for every change.
///
/// - `root` is the directory to watch.
/// - `recursive` selects whether subdirectories are watched too.
/// - `excludes` drops events whose every path is excluded.
/// - `runtime_tx` is the channel into the main runtime.
///
/// There is no debouncing here; bursts of requests are coalesced by the
/// runtime's rebuild queue.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    recursive: bool,
    excludes: ExcludeSet,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    warn!("failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                error!("file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    info!(root = ?root, recursive, "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_change(&event.kind) {
                continue;
            }

            if !excludes.is_empty()
                && !event.paths.is_empty()
                && event.paths.iter().all(|p| excludes.matches_path(&root, p))
            {
                debug!(paths = ?event.paths, "ignoring excluded paths");
                continue;
            }

            info!(kind = ?event.kind, paths = ?event.paths, "source change detected");

            if let Err(err) = runtime_tx
                .send(RuntimeEvent::RebuildRequested {
                    reason: TriggerReason::FileWatch,
                })
                .await
            {
                warn!("failed to send RuntimeEvent::RebuildRequested: {err}");
                // If the runtime channel is closed, there's no point
                // keeping the watcher loop alive.
                return;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
