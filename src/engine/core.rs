// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels and handing `StartRebuild` commands to a backend.
//!
//! The core can be tested without any Tokio, channels, filesystem, or
//! builders.

use tracing::{info, warn};

use crate::engine::queue::RebuildQueue;
use crate::engine::{RebuildOutcome, RuntimeEvent, RuntimeOptions, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a rebuild now.
    StartRebuild { reason: TriggerReason },
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Counts of finished rebuilds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub started: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Pure core runtime state.
///
/// Invariant: at most one rebuild is running; requests received meanwhile sit
/// in the queue as a single pending rebuild.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    running: bool,
    queue: RebuildQueue,
    options: RuntimeOptions,
    summary: RunSummary,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.running
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::RebuildRequested { reason } => self.handle_request(reason),
            RuntimeEvent::RebuildCompleted { outcome } => self.handle_completion(outcome),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn handle_request(&mut self, reason: TriggerReason) -> CoreStep {
        if self.running {
            self.queue.record_trigger(reason);
            return CoreStep::continue_with(Vec::new());
        }

        CoreStep::continue_with(vec![self.start(reason)])
    }

    fn handle_completion(&mut self, outcome: RebuildOutcome) -> CoreStep {
        if !self.running {
            warn!(?outcome, "completion received while no rebuild was running");
        }
        self.running = false;

        match outcome {
            RebuildOutcome::Succeeded => self.summary.succeeded += 1,
            RebuildOutcome::Skipped => self.summary.skipped += 1,
            RebuildOutcome::Failed => self.summary.failed += 1,
        }

        if let Some(pending) = self.queue.drain_pending() {
            info!(
                reason = ?pending.reason,
                coalesced = pending.coalesced,
                "starting queued rebuild"
            );
            return CoreStep::continue_with(vec![self.start(pending.reason)]);
        }

        if self.options.exit_when_idle {
            return CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            };
        }

        CoreStep::continue_with(Vec::new())
    }

    fn start(&mut self, reason: TriggerReason) -> CoreCommand {
        self.running = true;
        self.summary.started += 1;
        CoreCommand::StartRebuild { reason }
    }
}
