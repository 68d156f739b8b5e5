// src/engine/mod.rs

//! Rebuild orchestration.
//!
//! This module ties together:
//! - the rebuild queue (what happens when requests arrive while a rebuild is
//!   running)
//! - the main runtime event loop that reacts to:
//!   - start-up and file-watch rebuild requests
//!   - rebuild completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. At most one rebuild runs at any time.

/// Why a rebuild was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The unconditional rebuild at process start.
    Startup,
    /// A filesystem event in the source directory.
    FileWatch,
    /// Requested programmatically.
    Manual,
}

/// How a single rebuild ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The document was rendered and written.
    Succeeded,
    /// Sources were unchanged since the last success; nothing was written.
    Skipped,
    /// Build or write failed; previous output left in place.
    Failed,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no rebuild is running and none is
    /// pending (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, the backend and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Something wants the document rebuilt.
    RebuildRequested { reason: TriggerReason },
    /// The running rebuild finished.
    RebuildCompleted { outcome: RebuildOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod queue;
pub mod runtime;

pub use core::{CoreCommand, CoreRuntime, CoreStep, RunSummary};
pub use queue::{PendingRebuild, RebuildQueue};
pub use runtime::Runtime;
