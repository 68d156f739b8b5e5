// src/rebuild/backend.rs

//! Pluggable rebuild backend abstraction.
//!
//! The runtime talks to a `RebuildBackend` instead of running rebuilds
//! itself. This makes it easy to swap in a fake backend in tests while keeping
//! the production implementation here.
//!
//! - `RealRebuildBackend` runs each rebuild on its own Tokio task and reports
//!   `RuntimeEvent::RebuildCompleted` when it finishes, also when it panics.
//! - Tests can provide their own `RebuildBackend` that, for example, records
//!   which rebuilds were started and completes them on demand.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::engine::{RebuildOutcome, RuntimeEvent, TriggerReason};
use crate::errors::Result;

use super::Rebuilder;

/// Trait abstracting how a rebuild is started.
///
/// `start_rebuild` must not wait for the rebuild to finish; completion is
/// reported back through the runtime's event channel.
pub trait RebuildBackend: Send {
    fn start_rebuild(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real backend used in production.
pub struct RealRebuildBackend {
    rebuilder: Arc<Rebuilder>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealRebuildBackend {
    pub fn new(rebuilder: Arc<Rebuilder>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            rebuilder,
            runtime_tx,
        }
    }
}

impl RebuildBackend for RealRebuildBackend {
    fn start_rebuild(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let rebuilder = Arc::clone(&self.rebuilder);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let rebuild = tokio::spawn(async move { rebuilder.run(reason).await });
                let outcome = match rebuild.await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!(error = %err, "rebuild task panicked; keeping previous output");
                        RebuildOutcome::Failed
                    }
                };
                if let Err(err) = tx.send(RuntimeEvent::RebuildCompleted { outcome }).await {
                    warn!("failed to send RuntimeEvent::RebuildCompleted: {err}");
                }
            });
            Ok(())
        })
    }
}
