//! Governance core: proposals, signatures, timelock and action dispatch

pub mod clock;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod store;
pub mod threshold;
pub mod timelock;
pub mod types;

mod engine_test;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::{ActionDispatcher, ActionHandler};
pub use engine::{EngineSettings, GovernanceEngine};
pub use error::{DispatchError, GovernanceError, GovernanceResult};
pub use events::GovernanceEvent;
pub use registry::SignerRegistry;
pub use store::PendingSnapshot;
pub use types::{Proposal, ProposalDetails, ProposalId, ProposalStatus};
