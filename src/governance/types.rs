//! Data types for governance proposals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::models::{ActionKind, ActionPayload, Address};

/// Monotonically increasing proposal identifier, starting at 1
pub type ProposalId = u64;

/// Externally visible proposal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    /// Collecting signatures or waiting for the timelock
    Pending,
    /// Action applied; terminal
    Executed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "PENDING"),
            ProposalStatus::Executed => write!(f, "EXECUTED"),
        }
    }
}

/// A governed change awaiting signatures, timelock and execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub action: ActionPayload,
    pub proposer: Address,
    pub created_at: DateTime<Utc>,
    /// Distinct signers that have signed
    pub signatures: BTreeSet<Address>,
    /// Set once, the first time the signature count reaches the threshold
    pub execute_time: Option<DateTime<Utc>>,
    pub status: ProposalStatus,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        action: ActionPayload,
        proposer: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action,
            proposer,
            created_at,
            signatures: BTreeSet::new(),
            execute_time: None,
            status: ProposalStatus::Pending,
            executed_at: None,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn is_executed(&self) -> bool {
        self.status == ProposalStatus::Executed
    }
}

/// Summary polled by operator tooling to decide when to execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDetails {
    pub action_kind: ActionKind,
    pub execute_time: Option<DateTime<Utc>>,
}

impl From<&Proposal> for ProposalDetails {
    fn from(proposal: &Proposal) -> Self {
        Self {
            action_kind: proposal.kind(),
            execute_time: proposal.execute_time,
        }
    }
}
