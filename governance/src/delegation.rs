//! Vote delegation: entrust voting power to another account.
//!
//! Each account has at most one outgoing edge, so the graph is functional.
//! Edges are never validated against cycles: self-delegation and mutual
//! delegation are legal. Power resolution stays finite because it follows at
//! most [`MAX_DELEGATION_DEPTH`] hops, counting a node again whenever a cycle
//! brings the walk back to it.

use crate::error::GovernanceError;
use concord_ledger::TokenLedger;
use concord_types::{AccountId, MAX_DELEGATION_DEPTH};
use std::collections::{HashMap, HashSet};

/// The delegation graph: delegator → delegate, plus a reverse index.
#[derive(Clone, Debug, Default)]
pub struct DelegationGraph {
    /// delegator → delegate.
    delegations: HashMap<AccountId, AccountId>,
    /// Reverse index: delegate → set of direct delegators.
    reverse_delegations: HashMap<AccountId, HashSet<AccountId>>,
}

impl DelegationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph (and its reverse index) from stored edges.
    pub fn from_edges(
        edges: impl IntoIterator<Item = (AccountId, AccountId)>,
    ) -> Result<Self, GovernanceError> {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.delegate(&from, &to)?;
        }
        Ok(graph)
    }

    /// Set or replace `from`'s delegate. Returns the previous delegate.
    pub fn delegate(
        &mut self,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<Option<AccountId>, GovernanceError> {
        if from.is_null() || to.is_null() {
            return Err(GovernanceError::ZeroAddress);
        }
        let previous = self.delegations.insert(from.clone(), to.clone());
        if let Some(old_to) = &previous {
            self.unlink(from, old_to);
        }
        self.reverse_delegations
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        Ok(previous)
    }

    /// Remove `from`'s delegation, returning it to self-voting.
    pub fn undelegate(&mut self, from: &AccountId) -> Option<AccountId> {
        let old_to = self.delegations.remove(from)?;
        self.unlink(from, &old_to);
        Some(old_to)
    }

    fn unlink(&mut self, from: &AccountId, old_to: &AccountId) {
        if let Some(set) = self.reverse_delegations.get_mut(old_to) {
            set.remove(from);
            if set.is_empty() {
                self.reverse_delegations.remove(old_to);
            }
        }
    }

    /// The direct delegate of `account`, if any.
    pub fn delegate_of(&self, account: &AccountId) -> Option<&AccountId> {
        self.delegations.get(account)
    }

    /// Accounts that delegate directly to `delegate`, sorted.
    pub fn delegators_of(&self, delegate: &AccountId) -> Vec<&AccountId> {
        let mut out: Vec<&AccountId> = self
            .reverse_delegations
            .get(delegate)
            .map(|s| s.iter().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// All edges, sorted by delegator.
    pub fn edges(&self) -> Vec<(AccountId, AccountId)> {
        let mut out: Vec<(AccountId, AccountId)> = self
            .delegations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }

    /// The delegate hops whose balances count towards `account`'s power.
    ///
    /// Hop 1 is `account`'s own delegate; the walk stops at an account with
    /// no delegate or after hop [`MAX_DELEGATION_DEPTH`]. A node reached
    /// again through a cycle appears again.
    pub fn power_path(&self, account: &AccountId) -> Vec<&AccountId> {
        let mut hops = Vec::with_capacity(MAX_DELEGATION_DEPTH);
        let mut next = self.delegations.get(account);
        let mut depth = 1;
        while let Some(node) = next {
            if depth > MAX_DELEGATION_DEPTH {
                break;
            }
            hops.push(node);
            next = self.delegations.get(node);
            depth += 1;
        }
        hops
    }

    /// Effective voting power: own balance plus the balance of every hop on
    /// the [`power_path`](Self::power_path).
    pub fn resolve_power(
        &self,
        account: &AccountId,
        ledger: &TokenLedger,
    ) -> Result<u128, GovernanceError> {
        self.power_path(account)
            .into_iter()
            .try_fold(ledger.balance_of(account), |power, hop| {
                power.checked_add(ledger.balance_of(hop))
            })
            .ok_or(GovernanceError::ArithmeticOverflow)
    }
}
