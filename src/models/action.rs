use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

use super::account::{Address, Role};

/// Tag selecting which collaborator applies a proposal's effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "MANAGE_PERMISSION")]
    ManagePermission,
    #[serde(rename = "REGISTER_DAPP")]
    RegisterDApp,
    #[serde(rename = "SET_CROSSCHAIN_TOKEN")]
    SetCrosschainToken,
    #[serde(rename = "SET_PARAMETER")]
    SetParameter,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::ManagePermission => write!(f, "MANAGE_PERMISSION"),
            ActionKind::RegisterDApp => write!(f, "REGISTER_DAPP"),
            ActionKind::SetCrosschainToken => write!(f, "SET_CROSSCHAIN_TOKEN"),
            ActionKind::SetParameter => write!(f, "SET_PARAMETER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionOperation {
    Grant,
    Revoke,
}

/// Payload addresses must be strkey shaped: 56 ASCII characters
fn validate_address(value: &str) -> Result<(), ValidationError> {
    if Address::from(value).is_well_formed() {
        Ok(())
    } else {
        Err(ValidationError::new("address"))
    }
}

/// Grant or revoke a platform role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ManagePermission {
    pub role: Role,
    #[validate(custom(function = "validate_address"))]
    pub account: String,
    pub operation: PermissionOperation,
}

impl ManagePermission {
    pub fn account(&self) -> Address {
        Address::new(self.account.clone())
    }
}

/// Register a fee-paying integration and the account its fees are paid to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RegisterDApp {
    #[validate(length(min = 1, max = 64))]
    pub dapp_id: String,
    #[validate(custom(function = "validate_address"))]
    pub payee: String,
    /// Fee share in basis points
    #[validate(range(max = 10_000))]
    pub fee_bps: u32,
}

/// Map a local token contract to its representation on a remote chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetCrosschainToken {
    #[validate(range(min = 1))]
    pub chain_id: u32,
    #[validate(custom(function = "validate_address"))]
    pub local_token: String,
    #[validate(length(min = 1, max = 128))]
    pub remote_token: String,
}

/// Set a platform risk or configuration parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetParameter {
    #[validate(length(min = 1, max = 64))]
    pub key: String,
    pub value: Decimal,
}

/// Kind-specific payload of a proposal. Immutable once proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum ActionPayload {
    #[serde(rename = "MANAGE_PERMISSION")]
    ManagePermission(ManagePermission),
    #[serde(rename = "REGISTER_DAPP")]
    RegisterDApp(RegisterDApp),
    #[serde(rename = "SET_CROSSCHAIN_TOKEN")]
    SetCrosschainToken(SetCrosschainToken),
    #[serde(rename = "SET_PARAMETER")]
    SetParameter(SetParameter),
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::ManagePermission(_) => ActionKind::ManagePermission,
            ActionPayload::RegisterDApp(_) => ActionKind::RegisterDApp,
            ActionPayload::SetCrosschainToken(_) => ActionKind::SetCrosschainToken,
            ActionPayload::SetParameter(_) => ActionKind::SetParameter,
        }
    }

    /// Structural validation of the inner payload
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            ActionPayload::ManagePermission(p) => p.validate(),
            ActionPayload::RegisterDApp(p) => p.validate(),
            ActionPayload::SetCrosschainToken(p) => p.validate(),
            ActionPayload::SetParameter(p) => p.validate(),
        }
    }

    /// Hex SHA-256 of the canonical JSON encoding.
    ///
    /// Lets operators confirm the exact action before the timelock elapses.
    pub fn digest(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&encoded))
    }
}
