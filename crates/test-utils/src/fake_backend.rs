use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use specwatch::engine::{RebuildOutcome, RuntimeEvent, TriggerReason};
use specwatch::errors::Result;
use specwatch::rebuild::RebuildBackend;
use tokio::sync::mpsc;

/// A fake rebuild backend that:
/// - records the reason of every rebuild it was asked to start
/// - reports `RebuildCompleted` with the next scripted outcome
///   (`Succeeded` once the script runs out).
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<Vec<TriggerReason>>>,
    outcomes: Vec<RebuildOutcome>,
}

impl FakeBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        started: Arc<Mutex<Vec<TriggerReason>>>,
    ) -> Self {
        Self {
            runtime_tx,
            started,
            outcomes: Vec::new(),
        }
    }

    /// Outcomes reported for the first rebuilds, in order.
    pub fn with_outcomes(mut self, outcomes: &[RebuildOutcome]) -> Self {
        self.outcomes = outcomes.iter().rev().copied().collect();
        self
    }
}

impl RebuildBackend for FakeBackend {
    fn start_rebuild(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let outcome = self.outcomes.pop().unwrap_or(RebuildOutcome::Succeeded);
        self.started.lock().unwrap().push(reason);

        Box::pin(async move {
            tx.send(RuntimeEvent::RebuildCompleted { outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
