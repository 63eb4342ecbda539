//! Live view over role membership

use crate::models::{Address, Role};

/// Membership source consulted by the threshold policy and the signature
/// ledger. Implementations may change membership at any time; callers never
/// snapshot it onto a proposal.
pub trait SignerRegistry: Send + Sync {
    fn is_member(&self, role: Role, account: &Address) -> bool;

    fn member_count(&self, role: Role) -> usize;

    /// Current members, in a stable order
    fn members(&self, role: Role) -> Vec<Address>;
}
