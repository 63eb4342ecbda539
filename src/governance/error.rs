//! Error types for the governance engine

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ActionKind, Address, Role};
use crate::service::crosschain_registry::CrosschainError;
use crate::service::dapp_registry::DAppError;
use crate::service::parameter_store::ParameterError;
use crate::service::role_manager::RoleError;

use super::types::ProposalId;

/// Outcomes of propose / sign / execute that the caller must handle
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Caller lacks the proposer or signer capability
    #[error("{account} does not hold role {role}")]
    Unauthorized { account: Address, role: Role },

    /// Unknown proposal id, or the proposal was already executed
    #[error("Proposal not found: {0}")]
    NotFound(ProposalId),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{signer} has already signed proposal {proposal_id}")]
    AlreadySigned {
        proposal_id: ProposalId,
        signer: Address,
    },

    #[error("Insufficient signatures: {have} < {need}")]
    InsufficientSignatures { have: usize, need: usize },

    /// `execute_time` is `None` while the timelock has not been armed
    #[error("Timelock not elapsed (execute time: {})", display_time(.execute_time))]
    TimelockNotElapsed {
        execute_time: Option<DateTime<Utc>>,
    },

    #[error("Action dispatch failed: {0}")]
    ActionDispatchFailed(#[from] DispatchError),

    /// `now + confirmation_delay` is outside the representable time range
    #[error("Execute time out of range: {now} + {delay_secs}s")]
    ExecuteTimeOutOfRange { now: DateTime<Utc>, delay_secs: i64 },
}

impl GovernanceError {
    /// Only dispatch failures can succeed on a later retry with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GovernanceError::ActionDispatchFailed(_))
    }
}

fn display_time(time: &Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.to_rfc3339(),
        None => "unset".to_string(),
    }
}

/// Failures raised while applying a proposal's effect
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No handler registered for {0}")]
    NoHandler(ActionKind),

    #[error("Handler for {expected} received a {found} payload")]
    PayloadMismatch {
        expected: ActionKind,
        found: ActionKind,
    },

    #[error("Role manager error: {0}")]
    Role(#[from] RoleError),

    #[error("DApp registry error: {0}")]
    DApp(#[from] DAppError),

    #[error("Cross-chain registry error: {0}")]
    Crosschain(#[from] CrosschainError),

    #[error("Parameter store error: {0}")]
    Parameter(#[from] ParameterError),
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;
