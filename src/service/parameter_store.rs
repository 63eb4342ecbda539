//! Versioned platform parameters
//!
//! Every write creates a new version; older versions stay readable.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

use crate::governance::dispatcher::{mismatch, ActionHandler};
use crate::governance::DispatchError;
use crate::models::{ActionKind, ActionPayload};

pub type Version = u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Parameter {key} cannot be negative: {value}")]
    NegativeValue { key: String, value: Decimal },
}

#[derive(Default)]
struct Inner {
    latest: HashMap<String, Version>,
    values: HashMap<(String, Version), Decimal>,
}

#[derive(Default)]
pub struct ParameterStore {
    inner: RwLock<Inner>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a new version of `key` and return its version number
    pub fn set(&self, key: &str, value: Decimal) -> Result<Version, ParameterError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ParameterError::NegativeValue {
                key: key.to_string(),
                value,
            });
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let version = inner.latest.get(key).copied().unwrap_or(0) + 1;
        inner.values.insert((key.to_string(), version), value);
        inner.latest.insert(key.to_string(), version);

        info!(key, version, value = %value, "Parameter updated");
        Ok(version)
    }

    /// Latest value
    pub fn get(&self, key: &str) -> Option<Decimal> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let version = inner.latest.get(key)?;
        inner.values.get(&(key.to_string(), *version)).copied()
    }

    pub fn get_version(&self, key: &str, version: Version) -> Option<Decimal> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values
            .get(&(key.to_string(), version))
            .copied()
    }

    /// Latest version number, 0 if never set
    pub fn version(&self, key: &str) -> Version {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

impl ActionHandler for ParameterStore {
    fn handle(&self, action: &ActionPayload) -> Result<(), DispatchError> {
        match action {
            ActionPayload::SetParameter(parameter) => {
                self.set(&parameter.key, parameter.value)?;
                Ok(())
            }
            other => Err(mismatch(ActionKind::SetParameter, other)),
        }
    }
}
