// Service layer: collaborators receiving governed actions, the request-facing
// governance service and the execution keeper
pub mod crosschain_registry;
pub mod dapp_registry;
pub mod execution_keeper;
pub mod governance_service;
pub mod parameter_store;
pub mod role_manager;

pub use crosschain_registry::{CrosschainError, CrosschainRegistry};
pub use dapp_registry::{DAppError, DAppRecord, DAppRegistry};
pub use execution_keeper::{ExecutionKeeper, SweepReport};
pub use governance_service::{
    CreateProposalDto, GovernanceService, ProposalRecord, SignatureReceipt, SignerSetRecord,
};
pub use parameter_store::{ParameterError, ParameterStore};
pub use role_manager::{RoleError, RoleManager};
