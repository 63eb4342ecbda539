use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a strkey-encoded account or contract address.
pub const ADDRESS_LEN: usize = 56;

/// An account identity (`G…`) or contract identity (`C…`).
///
/// The engine treats addresses as opaque; structural checks happen where
/// addresses enter through action payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the address has the strkey length.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ADDRESS_LEN && self.0.is_ascii()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Capabilities managed by the role manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Signs governance proposals
    FoundationManager,
    /// Creates governance proposals
    Proposer,
    Operator,
    LoanManager,
    AuctionManager,
    BridgeOperator,
    OracleFeeder,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::FoundationManager,
        Role::Proposer,
        Role::Operator,
        Role::LoanManager,
        Role::AuctionManager,
        Role::BridgeOperator,
        Role::OracleFeeder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::FoundationManager => "FOUNDATION_MANAGER",
            Role::Proposer => "PROPOSER",
            Role::Operator => "OPERATOR",
            Role::LoanManager => "LOAN_MANAGER",
            Role::AuctionManager => "AUCTION_MANAGER",
            Role::BridgeOperator => "BRIDGE_OPERATOR",
            Role::OracleFeeder => "ORACLE_FEEDER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
