//! Action dispatch table

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::models::{ActionKind, ActionPayload};

use super::error::DispatchError;
use super::types::Proposal;

/// Applies one kind of governed action to the collaborator that owns it.
///
/// Implementations must either apply the whole effect or return an error
/// with nothing applied.
pub trait ActionHandler: Send + Sync {
    fn handle(&self, action: &ActionPayload) -> Result<(), DispatchError>;
}

/// Closed kind → handler table, fixed once built
#[derive(Clone, Default)]
pub struct ActionDispatcher {
    handlers: BTreeMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionDispatcher {
    pub fn builder() -> ActionDispatcherBuilder {
        ActionDispatcherBuilder::default()
    }

    /// Apply the proposal's action. The caller keeps the proposal pending on
    /// error.
    pub fn apply(&self, proposal: &Proposal) -> Result<(), DispatchError> {
        let kind = proposal.kind();
        let handler = self
            .handlers
            .get(&kind)
            .ok_or(DispatchError::NoHandler(kind))?;

        debug!(proposal_id = proposal.id, kind = %kind, "Dispatching action");
        handler.handle(&proposal.action)
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.handlers.keys().copied().collect()
    }

    pub fn handles(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

#[derive(Default)]
pub struct ActionDispatcherBuilder {
    handlers: BTreeMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionDispatcherBuilder {
    /// Associate `kind` with `handler`, replacing any earlier registration
    pub fn register(mut self, kind: ActionKind, handler: Arc<dyn ActionHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn build(self) -> ActionDispatcher {
        ActionDispatcher {
            handlers: self.handlers,
        }
    }
}

/// Error for a handler handed a payload of another kind
pub fn mismatch(expected: ActionKind, action: &ActionPayload) -> DispatchError {
    DispatchError::PayloadMismatch {
        expected,
        found: action.kind(),
    }
}
