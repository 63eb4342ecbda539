//! Role Manager
//!
//! Holds platform role membership. Doubles as the signer registry the
//! governance engine reads, so governed role grants change the signer set
//! (and with it the threshold) the moment they execute.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::info;

use crate::governance::dispatcher::{mismatch, ActionHandler};
use crate::governance::{DispatchError, SignerRegistry};
use crate::models::{ActionKind, ActionPayload, Address, PermissionOperation, Role};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("{account} already holds role {role}")]
    AlreadyMember { role: Role, account: Address },

    #[error("{account} does not hold role {role}")]
    NotMember { role: Role, account: Address },

    #[error("Cannot revoke the last member of role {0}")]
    LastMember(Role),
}

pub struct RoleManager {
    members: RwLock<HashMap<Role, BTreeSet<Address>>>,
    /// Roles that may never become empty
    protected: BTreeSet<Role>,
}

impl Default for RoleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleManager {
    /// Role manager whose signer role can never be emptied
    pub fn new() -> Self {
        Self::with_protected_roles([Role::FoundationManager])
    }

    pub fn with_protected_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            protected: roles.into_iter().collect(),
        }
    }

    pub fn grant(&self, role: Role, account: Address) -> Result<(), RoleError> {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let set = members.entry(role).or_default();
        if set.contains(&account) {
            return Err(RoleError::AlreadyMember { role, account });
        }

        info!(role = %role, account = %account, "Role granted");
        set.insert(account);
        Ok(())
    }

    pub fn revoke(&self, role: Role, account: &Address) -> Result<(), RoleError> {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let set = members.entry(role).or_default();
        if !set.contains(account) {
            return Err(RoleError::NotMember {
                role,
                account: account.clone(),
            });
        }
        if set.len() == 1 && self.protected.contains(&role) {
            return Err(RoleError::LastMember(role));
        }

        info!(role = %role, account = %account, "Role revoked");
        set.remove(account);
        Ok(())
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }
}

impl SignerRegistry for RoleManager {
    fn is_member(&self, role: Role, account: &Address) -> bool {
        self.has_role(role, account)
    }

    fn member_count(&self, role: Role) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .map(BTreeSet::len)
            .unwrap_or(0)
    }

    fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ActionHandler for RoleManager {
    fn handle(&self, action: &ActionPayload) -> Result<(), DispatchError> {
        let ActionPayload::ManagePermission(permission) = action else {
            return Err(mismatch(ActionKind::ManagePermission, action));
        };

        match permission.operation {
            PermissionOperation::Grant => self.grant(permission.role, permission.account())?,
            PermissionOperation::Revoke => self.revoke(permission.role, &permission.account())?,
        }
        Ok(())
    }
}
