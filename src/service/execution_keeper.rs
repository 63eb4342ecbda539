//! Execution Keeper
//!
//! Off-chain automation that polls pending proposals, re-checks signature
//! counts and armed timelocks, and submits execution once a proposal is due.
//! Failed dispatches are retried on the next tick.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::governance::{GovernanceEngine, GovernanceError, ProposalId};

/// Outcome of one pass over the pending proposals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub executed: Vec<ProposalId>,
    pub failed: Vec<(ProposalId, String)>,
    /// Below threshold or timelock not yet due
    pub waiting: Vec<ProposalId>,
}

pub struct ExecutionKeeper {
    engine: Arc<GovernanceEngine>,
    poll_interval: Duration,
}

impl ExecutionKeeper {
    pub fn new(engine: Arc<GovernanceEngine>, poll_interval: Duration) -> Self {
        Self {
            engine,
            poll_interval,
        }
    }

    /// Execute every pending proposal that is due at `now`
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();
        let threshold = self.engine.threshold();

        for id in self.engine.list_pending() {
            let (count, details) = match (self.engine.signature_count(id), self.engine.details(id)) {
                (Ok(count), Ok(details)) => (count, details),
                _ => continue,
            };

            let due = matches!(details.execute_time, Some(t) if now >= t);
            if count < threshold || !due {
                report.waiting.push(id);
                continue;
            }

            match self.engine.execute(id, now) {
                Ok(()) => report.executed.push(id),
                // Executed by another caller since the snapshot was taken
                Err(GovernanceError::NotFound(_)) => {}
                Err(e) => {
                    warn!(proposal_id = id, error = %e, retryable = e.is_retryable(), "Keeper execution failed");
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        report
    }

    /// Poll until `shutdown` flips to true or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = self.poll_interval.as_millis() as u64, "Execution keeper started");
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.sweep(self.engine.now());
                    if !report.executed.is_empty() || !report.failed.is_empty() {
                        info!(
                            executed = report.executed.len(),
                            failed = report.failed.len(),
                            waiting = report.waiting.len(),
                            "Keeper sweep completed"
                        );
                    } else {
                        debug!(waiting = report.waiting.len(), "Keeper sweep idle");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Execution keeper stopped");
    }
}
