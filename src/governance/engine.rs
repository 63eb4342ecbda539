//! # Governance Engine
//!
//! Multi-signer, time-locked proposal and execution engine gating every
//! privileged platform change.
//!
//! ## Lifecycle
//! - `propose`: a holder of the proposer role creates a pending proposal
//! - `sign`: holders of the signer role sign; the first time the signature
//!   count reaches the live threshold, the timelock is armed
//! - `execute`: once the timelock has elapsed, any caller re-validates and
//!   dispatches the action; success retires the proposal for good
//!
//! ## Security
//! - Threshold is `floor(n / 2) + 1` over the signer set at call time
//! - Each signer can sign once per proposal
//! - Execution re-checks the threshold, so a grown signer set blocks an
//!   armed proposal until it gathers more signatures
//! - Check, dispatch and retire run under the proposal lock (exactly once)
//! - A failed dispatch leaves the proposal pending for retry

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::models::{ActionPayload, Address, Role};

use super::clock::Clock;
use super::dispatcher::ActionDispatcher;
use super::error::{GovernanceError, GovernanceResult};
use super::events::{EventBus, GovernanceEvent};
use super::ledger::SignatureLedger;
use super::registry::SignerRegistry;
use super::store::{lock, PendingSnapshot, ProposalStore};
use super::threshold::ThresholdPolicy;
use super::timelock::TimelockGate;
use super::types::{Proposal, ProposalDetails, ProposalId};

/// Fixed engine parameters, set once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Role whose members sign proposals
    pub signer_role: Role,
    /// Role whose members may create proposals
    pub proposer_role: Role,
    pub confirmation_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            signer_role: Role::FoundationManager,
            proposer_role: Role::Proposer,
            confirmation_delay: Duration::hours(24),
        }
    }
}

pub struct GovernanceEngine {
    store: ProposalStore,
    ledger: SignatureLedger,
    threshold: ThresholdPolicy,
    timelock: TimelockGate,
    dispatcher: ActionDispatcher,
    registry: Arc<dyn SignerRegistry>,
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl GovernanceEngine {
    pub fn new(
        registry: Arc<dyn SignerRegistry>,
        dispatcher: ActionDispatcher,
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: ProposalStore::new(),
            ledger: SignatureLedger::new(registry.clone(), settings.signer_role),
            threshold: ThresholdPolicy::new(registry.clone(), settings.signer_role),
            timelock: TimelockGate::new(settings.confirmation_delay),
            dispatcher,
            registry,
            settings,
            clock,
            events: EventBus::new(),
        }
    }

    // ========================================================================
    // Core Proposal Functions
    // ========================================================================

    /// Create a pending proposal.
    ///
    /// # Errors
    /// * `Unauthorized` - proposer lacks the proposer role
    /// * `InvalidPayload` - payload fails structural validation, or no
    ///   handler is registered for its kind
    pub fn propose(
        &self,
        action: ActionPayload,
        proposer: &Address,
    ) -> GovernanceResult<ProposalId> {
        if !self.registry.is_member(self.settings.proposer_role, proposer) {
            warn!(proposer = %proposer, "Proposal rejected: proposer lacks role");
            return Err(GovernanceError::Unauthorized {
                account: proposer.clone(),
                role: self.settings.proposer_role,
            });
        }

        let kind = action.kind();
        if !self.dispatcher.handles(kind) {
            warn!(kind = %kind, "Proposal rejected: no handler for action kind");
            return Err(GovernanceError::InvalidPayload(format!(
                "no handler registered for {kind}"
            )));
        }

        let id = self.store.create(action, proposer.clone(), self.clock.now())?;

        info!(proposal_id = id, kind = %kind, proposer = %proposer, "Proposal created");
        self.events.publish(GovernanceEvent::ProposalCreated {
            proposal_id: id,
            kind,
            proposer: proposer.clone(),
        });

        Ok(id)
    }

    /// Sign a proposal and return the new signature count. Arms the
    /// timelock the first time the count reaches the threshold.
    ///
    /// # Errors
    /// * `NotFound` - unknown or already executed
    /// * `AlreadySigned` - signer already recorded
    /// * `Unauthorized` - signer lacks the signer role right now
    /// * `ExecuteTimeOutOfRange` - arming would overflow; nothing is recorded
    pub fn sign(&self, id: ProposalId, signer: &Address) -> GovernanceResult<usize> {
        let entry = self.store.entry(id)?;
        let mut proposal = lock(&entry);

        if proposal.is_executed() {
            return Err(GovernanceError::NotFound(id));
        }

        let count = self.ledger.sign(&mut proposal, signer)?;
        let threshold = self.threshold.threshold();

        let armed = match self.timelock.try_arm(&mut proposal, threshold, self.clock.now()) {
            Ok(armed) => armed,
            Err(e) => {
                self.ledger.withdraw(&mut proposal, signer);
                error!(proposal_id = id, signer = %signer, error = %e, "Timelock arming failed");
                return Err(e);
            }
        };

        debug!(
            proposal_id = id,
            signer = %signer,
            count,
            threshold,
            "Proposal signed"
        );
        self.events.publish(GovernanceEvent::ProposalSigned {
            proposal_id: id,
            signer: signer.clone(),
            signature_count: count,
            threshold,
        });

        if let Some(execute_time) = armed {
            info!(
                proposal_id = id,
                execute_time = %execute_time,
                "Threshold reached, timelock armed"
            );
            self.events.publish(GovernanceEvent::TimelockArmed {
                proposal_id: id,
                execute_time,
            });
        }

        Ok(count)
    }

    /// Re-validate and apply the proposal's action, then retire it.
    ///
    /// The whole sequence runs under the proposal lock: concurrent calls for
    /// the same id observe either the pending proposal or the retired one.
    ///
    /// # Errors
    /// * `NotFound` - unknown or already executed
    /// * `InsufficientSignatures` - below the live threshold
    /// * `TimelockNotElapsed` - not armed, or armed but not yet due
    /// * `ActionDispatchFailed` - collaborator refused; proposal stays pending
    pub fn execute(&self, id: ProposalId, now: DateTime<Utc>) -> GovernanceResult<()> {
        let entry = self.store.entry(id)?;
        let mut proposal = lock(&entry);

        // Execution guard first
        if proposal.is_executed() {
            return Err(GovernanceError::NotFound(id));
        }

        let have = self.ledger.count(&proposal);
        let need = self.threshold.threshold();
        if have < need {
            return Err(GovernanceError::InsufficientSignatures { have, need });
        }

        if !self.timelock.is_ready(&proposal, now) {
            return Err(GovernanceError::TimelockNotElapsed {
                execute_time: proposal.execute_time,
            });
        }

        if let Err(e) = self.dispatcher.apply(&proposal) {
            error!(proposal_id = id, error = %e, "Action dispatch failed");
            self.events.publish(GovernanceEvent::ExecutionFailed {
                proposal_id: id,
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        self.store.retire(&mut proposal, now);

        info!(proposal_id = id, kind = %proposal.kind(), "Proposal executed");
        self.events.publish(GovernanceEvent::ProposalExecuted {
            proposal_id: id,
            kind: proposal.kind(),
            executed_at: now,
        });

        Ok(())
    }

    // ========================================================================
    // Query Functions
    // ========================================================================

    pub fn signature_count(&self, id: ProposalId) -> GovernanceResult<usize> {
        let entry = self.store.entry(id)?;
        let proposal = lock(&entry);
        Ok(self.ledger.count(&proposal))
    }

    pub fn has_already_signed(&self, id: ProposalId, signer: &Address) -> GovernanceResult<bool> {
        let entry = self.store.entry(id)?;
        let proposal = lock(&entry);
        Ok(self.ledger.has_signed(&proposal, signer))
    }

    pub fn details(&self, id: ProposalId) -> GovernanceResult<ProposalDetails> {
        let entry = self.store.entry(id)?;
        let proposal = lock(&entry);
        Ok(ProposalDetails::from(&*proposal))
    }

    pub fn list_pending(&self) -> PendingSnapshot {
        self.store.list_pending()
    }

    /// Full snapshot, including executed proposals
    pub fn proposal(&self, id: ProposalId) -> GovernanceResult<Proposal> {
        self.store.get(id)
    }

    /// Addresses that signed the proposal
    pub fn signers(&self, id: ProposalId) -> GovernanceResult<Vec<Address>> {
        let entry = self.store.entry(id)?;
        let proposal = lock(&entry);
        Ok(proposal.signatures.iter().cloned().collect())
    }

    /// Signatures currently required to execute
    pub fn threshold(&self) -> usize {
        self.threshold.threshold()
    }

    /// Live members of the signer role
    pub fn signer_set(&self) -> Vec<Address> {
        self.registry.members(self.settings.signer_role)
    }

    pub fn confirmation_delay(&self) -> Duration {
        self.timelock.confirmation_delay()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn proposal_count(&self) -> usize {
        self.store.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GovernanceEvent> {
        self.events.subscribe()
    }
}
