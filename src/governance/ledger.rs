use std::sync::Arc;
use tracing::warn;

use crate::models::{Address, Role};

use super::error::{GovernanceError, GovernanceResult};
use super::registry::SignerRegistry;
use super::types::Proposal;

/// Records distinct signers per proposal.
///
/// Signer capability is checked against the registry at signing time. A
/// signature recorded before the signer lost the role keeps counting.
#[derive(Clone)]
pub struct SignatureLedger {
    registry: Arc<dyn SignerRegistry>,
    signer_role: Role,
}

impl SignatureLedger {
    pub fn new(registry: Arc<dyn SignerRegistry>, signer_role: Role) -> Self {
        Self {
            registry,
            signer_role,
        }
    }

    /// Record `signer` on the proposal and return the new signature count.
    ///
    /// The proposal is left untouched on error.
    pub fn sign(&self, proposal: &mut Proposal, signer: &Address) -> GovernanceResult<usize> {
        if proposal.signatures.contains(signer) {
            return Err(GovernanceError::AlreadySigned {
                proposal_id: proposal.id,
                signer: signer.clone(),
            });
        }

        if !self.registry.is_member(self.signer_role, signer) {
            warn!(
                proposal_id = proposal.id,
                signer = %signer,
                "Signature rejected: signer lacks role"
            );
            return Err(GovernanceError::Unauthorized {
                account: signer.clone(),
                role: self.signer_role,
            });
        }

        proposal.signatures.insert(signer.clone());
        Ok(proposal.signatures.len())
    }

    /// Undo a signature recorded by the current, still-locked `sign` call
    pub fn withdraw(&self, proposal: &mut Proposal, signer: &Address) {
        proposal.signatures.remove(signer);
    }

    pub fn count(&self, proposal: &Proposal) -> usize {
        proposal.signatures.len()
    }

    pub fn has_signed(&self, proposal: &Proposal, signer: &Address) -> bool {
        proposal.signatures.contains(signer)
    }
}
