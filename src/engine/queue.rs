// src/engine/queue.rs

use tracing::debug;

use super::TriggerReason;

/// A rebuild waiting for the running one to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRebuild {
    /// Reason of the first request that created this entry.
    pub reason: TriggerReason,
    /// How many requests were folded into it (at least 1).
    pub coalesced: usize,
}

/// Requests that arrive while a rebuild is running.
///
/// There is a single rebuild target, so any number of requests recorded
/// during one rebuild collapse into one pending entry: running the build
/// twice against the same (newest) sources cannot produce anything the
/// second run would not.
#[derive(Debug, Default)]
pub struct RebuildQueue {
    pending: Option<PendingRebuild>,
}

impl RebuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no rebuild is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    pub fn pending(&self) -> Option<PendingRebuild> {
        self.pending
    }

    /// Record that a rebuild was requested while another one is running.
    pub fn record_trigger(&mut self, reason: TriggerReason) {
        match &mut self.pending {
            Some(pending) => {
                pending.coalesced += 1;
                debug!(
                    ?reason,
                    coalesced = pending.coalesced,
                    "merged request into pending rebuild"
                );
            }
            None => {
                self.pending = Some(PendingRebuild {
                    reason,
                    coalesced: 1,
                });
                debug!(?reason, "queued rebuild behind the running one");
            }
        }
    }

    /// Take the pending rebuild, if any.
    pub fn drain_pending(&mut self) -> Option<PendingRebuild> {
        self.pending.take()
    }
}
