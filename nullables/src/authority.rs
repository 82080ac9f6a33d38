//! Nullable authority gate with a programmable allow-list.

use concord_types::{AccountId, AuthorityGate};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

#[derive(Debug)]
enum Policy {
    AllowAll,
    Listed(HashSet<AccountId>),
}

/// An [`AuthorityGate`] for tests. Counts how often it was consulted.
#[derive(Debug)]
pub struct NullAuthority {
    policy: RefCell<Policy>,
    checks: Cell<usize>,
}

impl NullAuthority {
    /// Admits every non-null caller.
    pub fn allow_all() -> Self {
        Self::with_policy(Policy::AllowAll)
    }

    /// Admits nobody until [`grant`](Self::grant) is called.
    pub fn deny_all() -> Self {
        Self::with_policy(Policy::Listed(HashSet::new()))
    }

    /// Admits exactly `account`.
    pub fn only(account: AccountId) -> Self {
        let authority = Self::deny_all();
        authority.grant(account);
        authority
    }

    fn with_policy(policy: Policy) -> Self {
        Self {
            policy: RefCell::new(policy),
            checks: Cell::new(0),
        }
    }

    pub fn grant(&self, account: AccountId) {
        let mut policy = self.policy.borrow_mut();
        match &mut *policy {
            Policy::AllowAll => {}
            Policy::Listed(set) => {
                set.insert(account);
            }
        }
    }

    /// Withdraw `account`. Under `allow_all` this switches to an explicit
    /// list that is empty.
    pub fn revoke(&self, account: &AccountId) {
        let mut policy = self.policy.borrow_mut();
        match &mut *policy {
            Policy::AllowAll => *policy = Policy::Listed(HashSet::new()),
            Policy::Listed(set) => {
                set.remove(account);
            }
        }
    }

    /// Number of `is_authorized` calls so far.
    pub fn checks(&self) -> usize {
        self.checks.get()
    }
}

impl AuthorityGate for NullAuthority {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self.checks.set(self.checks.get() + 1);
        if caller.is_null() {
            return false;
        }
        match &*self.policy.borrow() {
            Policy::AllowAll => true,
            Policy::Listed(set) => set.contains(caller),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> AccountId {
        AccountId::new(format!("ccd_{}", name))
    }

    #[test]
    fn only_admits_listed() {
        let gate = NullAuthority::only(account("owner"));
        assert!(gate.is_authorized(&account("owner")));
        assert!(!gate.is_authorized(&account("eve")));
        assert_eq!(gate.checks(), 2);
    }

    #[test]
    fn grant_and_revoke() {
        let gate = NullAuthority::deny_all();
        assert!(!gate.is_authorized(&account("a")));
        gate.grant(account("a"));
        assert!(gate.is_authorized(&account("a")));
        gate.revoke(&account("a"));
        assert!(!gate.is_authorized(&account("a")));
    }

    #[test]
    fn allow_all_still_refuses_null() {
        let gate = NullAuthority::allow_all();
        assert!(gate.is_authorized(&account("anyone")));
        assert!(!gate.is_authorized(&AccountId::null()));
        gate.revoke(&account("anyone"));
        assert!(!gate.is_authorized(&account("anyone")));
    }
}
