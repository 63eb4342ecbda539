//! Governance events published for operator tooling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{ActionKind, Address};

use super::types::ProposalId;

/// Buffered events per subscriber before the slowest one starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceEvent {
    ProposalCreated {
        proposal_id: ProposalId,
        kind: ActionKind,
        proposer: Address,
    },
    ProposalSigned {
        proposal_id: ProposalId,
        signer: Address,
        signature_count: usize,
        threshold: usize,
    },
    TimelockArmed {
        proposal_id: ProposalId,
        execute_time: DateTime<Utc>,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        kind: ActionKind,
        executed_at: DateTime<Utc>,
    },
    ExecutionFailed {
        proposal_id: ProposalId,
        reason: String,
    },
}

impl GovernanceEvent {
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            GovernanceEvent::ProposalCreated { proposal_id, .. }
            | GovernanceEvent::ProposalSigned { proposal_id, .. }
            | GovernanceEvent::TimelockArmed { proposal_id, .. }
            | GovernanceEvent::ProposalExecuted { proposal_id, .. }
            | GovernanceEvent::ExecutionFailed { proposal_id, .. } => *proposal_id,
        }
    }
}

/// Fan-out of governance events
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GovernanceEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn publish(&self, event: GovernanceEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GovernanceEvent> {
        self.sender.subscribe()
    }
}
