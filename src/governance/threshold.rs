use std::sync::Arc;

use crate::models::Role;

use super::registry::SignerRegistry;

/// Simple majority of the signer set: `floor(n / 2) + 1`.
pub fn required_signatures(signer_count: usize) -> usize {
    signer_count / 2 + 1
}

/// Derives the required signature count from the live signer set.
///
/// Never cached: a proposal created when the set had three members needs
/// three signatures if the set has grown to five by the time it executes.
#[derive(Clone)]
pub struct ThresholdPolicy {
    registry: Arc<dyn SignerRegistry>,
    signer_role: Role,
}

impl ThresholdPolicy {
    pub fn new(registry: Arc<dyn SignerRegistry>, signer_role: Role) -> Self {
        Self {
            registry,
            signer_role,
        }
    }

    pub fn threshold(&self) -> usize {
        required_signatures(self.registry.member_count(self.signer_role))
    }
}
