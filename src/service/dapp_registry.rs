//! Registry of fee-paying integrations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

use crate::governance::dispatcher::{mismatch, ActionHandler};
use crate::governance::DispatchError;
use crate::models::{ActionKind, ActionPayload, Address, RegisterDApp};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DAppError {
    #[error("DApp already registered: {0}")]
    AlreadyRegistered(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DAppRecord {
    pub dapp_id: String,
    pub payee: Address,
    pub fee_bps: u32,
}

#[derive(Default)]
pub struct DAppRegistry {
    dapps: RwLock<BTreeMap<String, DAppRecord>>,
}

impl DAppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registration: &RegisterDApp) -> Result<(), DAppError> {
        let mut dapps = self.dapps.write().unwrap_or_else(PoisonError::into_inner);
        if dapps.contains_key(&registration.dapp_id) {
            return Err(DAppError::AlreadyRegistered(registration.dapp_id.clone()));
        }

        let record = DAppRecord {
            dapp_id: registration.dapp_id.clone(),
            payee: Address::new(registration.payee.clone()),
            fee_bps: registration.fee_bps,
        };
        info!(
            dapp_id = %record.dapp_id,
            payee = %record.payee,
            fee_bps = record.fee_bps,
            "DApp registered"
        );
        dapps.insert(record.dapp_id.clone(), record);
        Ok(())
    }

    pub fn get(&self, dapp_id: &str) -> Option<DAppRecord> {
        self.dapps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dapp_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.dapps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionHandler for DAppRegistry {
    fn handle(&self, action: &ActionPayload) -> Result<(), DispatchError> {
        match action {
            ActionPayload::RegisterDApp(registration) => Ok(self.register(registration)?),
            other => Err(mismatch(ActionKind::RegisterDApp, other)),
        }
    }
}
