//! The privileged-authority capability.
//!
//! Minting, burning and proposal execution are restricted to an authorized
//! caller. Who counts as authorized is decided by the host, so the check is
//! injected as an [`AuthorityGate`] instead of being a stored owner field.

use crate::address::AccountId;

/// Answers "is this caller the designated authority?".
pub trait AuthorityGate {
    fn is_authorized(&self, caller: &AccountId) -> bool;
}

/// A gate that admits exactly one account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleAuthority {
    account: AccountId,
}

impl SingleAuthority {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }
}

impl AuthorityGate for SingleAuthority {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        !caller.is_null() && *caller == self.account
    }
}

impl<F> AuthorityGate for F
where
    F: Fn(&AccountId) -> bool,
{
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self(caller)
    }
}
