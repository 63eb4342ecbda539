//! Cross-chain token mappings for the bridge

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

use crate::governance::dispatcher::{mismatch, ActionHandler};
use crate::governance::DispatchError;
use crate::models::{ActionKind, ActionPayload, SetCrosschainToken};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrosschainError {
    #[error("Chain {0} is not supported by the bridge")]
    UnsupportedChain(u32),
}

#[derive(Default)]
struct Inner {
    chains: BTreeSet<u32>,
    /// (chain id, local token) -> remote token
    mappings: BTreeMap<(u32, String), String>,
}

#[derive(Default)]
pub struct CrosschainRegistry {
    inner: RwLock<Inner>,
}

impl CrosschainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator-side bridge enablement. Returns false if already enabled.
    pub fn enable_chain(&self, chain_id: u32) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let added = inner.chains.insert(chain_id);
        if added {
            info!(chain_id, "Bridge chain enabled");
        }
        added
    }

    pub fn is_enabled(&self, chain_id: u32) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .chains
            .contains(&chain_id)
    }

    /// Create or replace the mapping for a local token on an enabled chain
    pub fn set_token_mapping(&self, mapping: &SetCrosschainToken) -> Result<(), CrosschainError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !inner.chains.contains(&mapping.chain_id) {
            return Err(CrosschainError::UnsupportedChain(mapping.chain_id));
        }

        inner.mappings.insert(
            (mapping.chain_id, mapping.local_token.clone()),
            mapping.remote_token.clone(),
        );
        info!(
            chain_id = mapping.chain_id,
            local_token = %mapping.local_token,
            remote_token = %mapping.remote_token,
            "Cross-chain token mapped"
        );
        Ok(())
    }

    pub fn mapping(&self, chain_id: u32, local_token: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .mappings
            .get(&(chain_id, local_token.to_string()))
            .cloned()
    }
}

impl ActionHandler for CrosschainRegistry {
    fn handle(&self, action: &ActionPayload) -> Result<(), DispatchError> {
        match action {
            ActionPayload::SetCrosschainToken(mapping) => Ok(self.set_token_mapping(mapping)?),
            other => Err(mismatch(ActionKind::SetCrosschainToken, other)),
        }
    }
}
