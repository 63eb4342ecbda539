//! Proposal arena and pending index

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

use crate::models::{ActionPayload, Address};

use super::error::{GovernanceError, GovernanceResult};
use super::types::{Proposal, ProposalId, ProposalStatus};

/// Lock handle for a single proposal
pub type ProposalEntry = Arc<Mutex<Proposal>>;

/// Owns proposal identity, state and the pending index.
///
/// Lock order: arena, then a proposal, then the pending index.
pub struct ProposalStore {
    next_id: AtomicU64,
    proposals: RwLock<HashMap<ProposalId, ProposalEntry>>,
    pending: RwLock<BTreeSet<ProposalId>>,
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            proposals: RwLock::new(HashMap::new()),
            pending: RwLock::new(BTreeSet::new()),
        }
    }

    /// Validate the payload, allocate the next id and index the proposal as
    /// pending. Capability checks are the caller's job.
    pub fn create(
        &self,
        action: ActionPayload,
        proposer: Address,
        now: DateTime<Utc>,
    ) -> GovernanceResult<ProposalId> {
        action
            .validate()
            .map_err(|e| GovernanceError::InvalidPayload(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let proposal = Proposal::new(id, action, proposer, now);

        let mut proposals = self.proposals.write().unwrap_or_else(PoisonError::into_inner);
        proposals.insert(id, Arc::new(Mutex::new(proposal)));
        self.pending
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);

        debug!(proposal_id = id, "Proposal stored");
        Ok(id)
    }

    /// The lock handle for `id`
    pub fn entry(&self, id: ProposalId) -> GovernanceResult<ProposalEntry> {
        self.proposals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(GovernanceError::NotFound(id))
    }

    /// Snapshot of the proposal, executed or not
    pub fn get(&self, id: ProposalId) -> GovernanceResult<Proposal> {
        let entry = self.entry(id)?;
        let proposal = lock(&entry).clone();
        Ok(proposal)
    }

    pub fn list_pending(&self) -> PendingSnapshot {
        let ids = self
            .pending
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        PendingSnapshot { ids }
    }

    pub fn is_pending(&self, id: ProposalId) -> bool {
        self.pending
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Mark the locked proposal executed and drop it from the pending index.
    /// Only the engine's execute path calls this, with the proposal lock held.
    pub fn retire(&self, proposal: &mut Proposal, now: DateTime<Utc>) {
        proposal.status = ProposalStatus::Executed;
        proposal.executed_at = Some(now);
        self.pending
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&proposal.id);

        debug!(proposal_id = proposal.id, "Proposal retired");
    }

    /// Number of proposals ever created
    pub fn len(&self) -> usize {
        self.proposals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock a proposal entry, recovering from poisoning.
///
/// Every mutation runs its checks before writing, and `sign` withdraws its
/// signature if arming fails, so no error path leaves a half-applied proposal.
pub fn lock(entry: &ProposalEntry) -> MutexGuard<'_, Proposal> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ascending pending ids captured at one point in time.
///
/// Iterating holds no lock and can be restarted with [`PendingSnapshot::iter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSnapshot {
    ids: Vec<ProposalId>,
}

impl PendingSnapshot {
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, ProposalId>> {
        self.ids.iter().copied()
    }

    pub fn contains(&self, id: ProposalId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_vec(self) -> Vec<ProposalId> {
        self.ids
    }
}

impl IntoIterator for PendingSnapshot {
    type Item = ProposalId;
    type IntoIter = std::vec::IntoIter<ProposalId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

impl<'a> IntoIterator for &'a PendingSnapshot {
    type Item = ProposalId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ProposalId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
