//! Governance Service
//!
//! Request-facing wrapper around the governance engine. Converts engine
//! results into records for the HTTP layer and operator tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::governance::{
    GovernanceEngine, GovernanceResult, Proposal, ProposalId, ProposalStatus,
};
use crate::models::{ActionKind, ActionPayload, Address};

/// DTO for creating a new proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProposalDto {
    pub proposer: Address,
    pub action: ActionPayload,
}

/// DTO for a proposal record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub proposal_id: ProposalId,
    pub kind: ActionKind,
    pub action: ActionPayload,
    /// SHA-256 of the canonical payload, for out-of-band verification
    pub payload_digest: String,
    pub proposer: Address,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub execute_time: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub signatures: Vec<Address>,
    pub signature_count: usize,
    /// Live threshold at the time the record was built
    pub threshold: usize,
}

impl ProposalRecord {
    fn from_proposal(proposal: Proposal, threshold: usize) -> Self {
        Self {
            proposal_id: proposal.id,
            kind: proposal.kind(),
            payload_digest: proposal.action.digest(),
            signature_count: proposal.signatures.len(),
            signatures: proposal.signatures.into_iter().collect(),
            action: proposal.action,
            proposer: proposal.proposer,
            status: proposal.status,
            created_at: proposal.created_at,
            execute_time: proposal.execute_time,
            executed_at: proposal.executed_at,
            threshold,
        }
    }
}

/// Result of a successful signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureReceipt {
    pub proposal_id: ProposalId,
    pub signer: Address,
    pub signature_count: usize,
    pub threshold: usize,
    pub execute_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerSetRecord {
    pub signers: Vec<Address>,
    pub threshold: usize,
    pub confirmation_delay_secs: i64,
}

#[derive(Clone)]
pub struct GovernanceService {
    engine: Arc<GovernanceEngine>,
}

impl GovernanceService {
    pub fn new(engine: Arc<GovernanceEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<GovernanceEngine> {
        &self.engine
    }

    pub fn create_proposal(&self, dto: CreateProposalDto) -> GovernanceResult<ProposalId> {
        info!(
            kind = %dto.action.kind(),
            proposer = %dto.proposer,
            "Creating governance proposal"
        );
        self.engine.propose(dto.action, &dto.proposer)
    }

    pub fn sign_proposal(
        &self,
        proposal_id: ProposalId,
        signer: &Address,
    ) -> GovernanceResult<SignatureReceipt> {
        let signature_count = self.engine.sign(proposal_id, signer)?;
        let details = self.engine.details(proposal_id)?;

        Ok(SignatureReceipt {
            proposal_id,
            signer: signer.clone(),
            signature_count,
            threshold: self.engine.threshold(),
            execute_time: details.execute_time,
        })
    }

    /// Execute at the engine clock's current time
    pub fn execute_proposal(&self, proposal_id: ProposalId) -> GovernanceResult<ProposalRecord> {
        let now = self.engine.now();
        info!(proposal_id, now = %now, "Executing proposal");

        self.engine.execute(proposal_id, now)?;
        self.get_proposal(proposal_id)
    }

    pub fn get_proposal(&self, proposal_id: ProposalId) -> GovernanceResult<ProposalRecord> {
        let proposal = self.engine.proposal(proposal_id)?;
        Ok(ProposalRecord::from_proposal(proposal, self.engine.threshold()))
    }

    pub fn list_pending(&self) -> Vec<ProposalId> {
        self.engine.list_pending().into_vec()
    }

    pub fn has_signed(&self, proposal_id: ProposalId, signer: &Address) -> GovernanceResult<bool> {
        self.engine.has_already_signed(proposal_id, signer)
    }

    pub fn signer_set(&self) -> SignerSetRecord {
        SignerSetRecord {
            signers: self.engine.signer_set(),
            threshold: self.engine.threshold(),
            confirmation_delay_secs: self.engine.confirmation_delay().num_seconds(),
        }
    }
}
