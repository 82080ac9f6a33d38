//! The token ledger: balances, allowances and total supply.
//!
//! Conservation invariant: the sum of all balances equals `total_supply`
//! after every operation. Every mutating method runs all of its checks and
//! all of its arithmetic before touching a map, so a failed call leaves the
//! ledger exactly as it was.

use crate::error::LedgerError;
use crate::snapshot::LedgerSnapshot;
use concord_types::{AccountId, AuthorityGate};
use std::collections::{HashMap, HashSet};

/// Allowances of `u128::MAX` are never decremented.
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

/// In-memory fungible token ledger.
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    /// Non-zero balances only; absent accounts read as 0.
    balances: HashMap<AccountId, u128>,
    /// (owner, spender) → remaining allowance; zero entries are dropped.
    allowances: HashMap<(AccountId, AccountId), u128>,
    total_supply: u128,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`, 0 for accounts never credited.
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Remaining amount `spender` may move out of `owner`'s balance.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// All accounts holding a non-zero balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, u128)> + '_ {
        self.balances.iter().map(|(a, b)| (a, *b))
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if from.is_null() || to.is_null() {
            return Err(LedgerError::ZeroAddress);
        }
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.set_balance(from, debited);
        self.set_balance(to, credited);
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s balance, replacing any prior value.
    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if owner.is_null() || spender.is_null() {
            return Err(LedgerError::ZeroAddress);
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    ///
    /// Returns the allowance left afterwards.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        if spender.is_null() {
            return Err(LedgerError::ZeroAddress);
        }
        let available = self.allowance(from, spender);
        let remaining = if available == UNLIMITED_ALLOWANCE {
            available
        } else {
            available
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientAllowance {
                    needed: amount,
                    available,
                })?
        };
        self.transfer(from, to, amount)?;
        if remaining != available {
            self.set_allowance(from, spender, remaining);
        }
        Ok(remaining)
    }

    /// Create `amount` new tokens in `account`. Authority only.
    pub fn mint(
        &mut self,
        authority: &dyn AuthorityGate,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if !authority.is_authorized(caller) {
            return Err(LedgerError::Unauthorized(caller.to_string()));
        }
        if account.is_null() {
            return Err(LedgerError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_supply = supply;
        self.set_balance(account, balance);
        Ok(())
    }

    /// Destroy `amount` tokens held by `account`. Authority only.
    pub fn burn(
        &mut self,
        authority: &dyn AuthorityGate,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if !authority.is_authorized(caller) {
            return Err(LedgerError::Unauthorized(caller.to_string()));
        }
        if account.is_null() {
            return Err(LedgerError::ZeroAddress);
        }
        let available = self.balance_of(account);
        let balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticUnderflow)?;
        self.total_supply = supply;
        self.set_balance(account, balance);
        Ok(())
    }

    /// Sum of all balances, `None` if it does not fit in `u128`.
    pub fn balance_sum(&self) -> Option<u128> {
        self.balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
    }

    /// Capture the ledger in a deterministic (sorted) form.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut balances: Vec<(AccountId, u128)> = self
            .balances
            .iter()
            .map(|(a, b)| (a.clone(), *b))
            .collect();
        balances.sort();
        let mut allowances: Vec<(AccountId, AccountId, u128)> = self
            .allowances
            .iter()
            .map(|((o, s), v)| (o.clone(), s.clone(), *v))
            .collect();
        allowances.sort();
        LedgerSnapshot {
            balances,
            allowances,
            total_supply: self.total_supply,
        }
    }

    /// Rebuild a ledger from a snapshot, refusing one that breaks conservation.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        let mut seen_accounts = HashSet::new();
        for (account, balance) in snapshot.balances {
            if account.is_null() {
                return Err(LedgerError::ZeroAddress);
            }
            if !seen_accounts.insert(account.clone()) {
                return Err(LedgerError::DuplicateEntry(format!("balance of {}", account)));
            }
            ledger.set_balance(&account, balance);
        }
        let mut seen_pairs = HashSet::new();
        for (owner, spender, amount) in snapshot.allowances {
            if owner.is_null() || spender.is_null() {
                return Err(LedgerError::ZeroAddress);
            }
            if !seen_pairs.insert((owner.clone(), spender.clone())) {
                return Err(LedgerError::DuplicateEntry(format!(
                    "allowance of {} for {}",
                    spender, owner
                )));
            }
            ledger.set_allowance(&owner, &spender, amount);
        }
        let sum = ledger.balance_sum().ok_or(LedgerError::ArithmeticOverflow)?;
        if sum != snapshot.total_supply {
            return Err(LedgerError::SupplyMismatch {
                supply: snapshot.total_supply,
                sum,
            });
        }
        ledger.total_supply = snapshot.total_supply;
        Ok(ledger)
    }

    fn set_balance(&mut self, account: &AccountId, balance: u128) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), balance);
        }
    }

    fn set_allowance(&mut self, owner: &AccountId, spender: &AccountId, amount: u128) {
        let key = (owner.clone(), spender.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_types::SingleAuthority;

    fn account(name: &str) -> AccountId {
        AccountId::new(format!("ccd_{}", name))
    }

    fn funded(name: &str, amount: u128) -> (TokenLedger, SingleAuthority) {
        let gate = SingleAuthority::new(account("owner"));
        let mut ledger = TokenLedger::new();
        ledger
            .mint(&gate, &account("owner"), &account(name), amount)
            .unwrap();
        (ledger, gate)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    #[test]
    fn unknown_account_reads_zero() {
        let ledger = TokenLedger::new();
        assert_eq!(ledger.balance_of(&account("ghost")), 0);
        assert_eq!(ledger.total_supply(), 0);
        assert_eq!(ledger.allowance(&account("a"), &account("b")), 0);
    }

    // ── Transfer ────────────────────────────────────────────────────────

    #[test]
    fn transfer_moves_balance_and_keeps_supply() {
        let (mut ledger, _) = funded("alice", 1000);
        ledger.transfer(&account("alice"), &account("bob"), 300).unwrap();
        assert_eq!(ledger.balance_of(&account("alice")), 700);
        assert_eq!(ledger.balance_of(&account("bob")), 300);
        assert_eq!(ledger.total_supply(), 1000);
        assert_eq!(ledger.balance_sum(), Some(1000));
    }

    #[test]
    fn transfer_insufficient_balance() {
        let (mut ledger, _) = funded("alice", 10);
        let err = ledger
            .transfer(&account("alice"), &account("bob"), 11)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(ledger.balance_of(&account("alice")), 10);
    }

    #[test]
    fn transfer_rejects_null_endpoints() {
        let (mut ledger, _) = funded("alice", 10);
        assert_eq!(
            ledger.transfer(&account("alice"), &AccountId::null(), 1),
            Err(LedgerError::ZeroAddress)
        );
        assert_eq!(
            ledger.transfer(&AccountId::null(), &account("alice"), 0),
            Err(LedgerError::ZeroAddress)
        );
    }

    #[test]
    fn transfer_to_self_is_a_noop() {
        let (mut ledger, _) = funded("alice", 10);
        ledger.transfer(&account("alice"), &account("alice"), 10).unwrap();
        assert_eq!(ledger.balance_of(&account("alice")), 10);
        assert!(ledger.transfer(&account("alice"), &account("alice"), 11).is_err());
    }

    #[test]
    fn transfer_of_whole_balance_drops_entry() {
        let (mut ledger, _) = funded("alice", 10);
        ledger.transfer(&account("alice"), &account("bob"), 10).unwrap();
        assert_eq!(ledger.accounts().count(), 1);
    }

    // ── Mint / burn ─────────────────────────────────────────────────────

    #[test]
    fn mint_requires_authority() {
        let gate = SingleAuthority::new(account("owner"));
        let mut ledger = TokenLedger::new();
        let err = ledger
            .mint(&gate, &account("mallory"), &account("mallory"), 5)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn mint_to_null_rejected() {
        let gate = SingleAuthority::new(account("owner"));
        let mut ledger = TokenLedger::new();
        assert_eq!(
            ledger.mint(&gate, &account("owner"), &AccountId::null(), 5),
            Err(LedgerError::ZeroAddress)
        );
    }

    #[test]
    fn mint_overflow_is_trapped() {
        let (mut ledger, gate) = funded("alice", u128::MAX);
        let err = ledger
            .mint(&gate, &account("owner"), &account("bob"), 1)
            .unwrap_err();
        assert_eq!(err, LedgerError::ArithmeticOverflow);
        assert_eq!(ledger.total_supply(), u128::MAX);
        assert_eq!(ledger.balance_of(&account("bob")), 0);
    }

    #[test]
    fn burn_reduces_balance_and_supply() {
        let (mut ledger, gate) = funded("alice", 100);
        ledger
            .burn(&gate, &account("owner"), &account("alice"), 40)
            .unwrap();
        assert_eq!(ledger.balance_of(&account("alice")), 60);
        assert_eq!(ledger.total_supply(), 60);
    }

    #[test]
    fn burn_insufficient_balance() {
        let (mut ledger, gate) = funded("alice", 100);
        let err = ledger
            .burn(&gate, &account("owner"), &account("alice"), 101)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn burn_requires_authority() {
        let (mut ledger, gate) = funded("alice", 100);
        let err = ledger
            .burn(&gate, &account("alice"), &account("alice"), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
    }

    // ── Allowances ──────────────────────────────────────────────────────

    #[test]
    fn transfer_from_consumes_allowance() {
        let (mut ledger, _) = funded("alice", 100);
        ledger.approve(&account("alice"), &account("bob"), 30).unwrap();
        let left = ledger
            .transfer_from(&account("bob"), &account("alice"), &account("carol"), 20)
            .unwrap();
        assert_eq!(left, 10);
        assert_eq!(ledger.allowance(&account("alice"), &account("bob")), 10);
        assert_eq!(ledger.balance_of(&account("carol")), 20);
    }

    #[test]
    fn transfer_from_insufficient_allowance() {
        let (mut ledger, _) = funded("alice", 100);
        ledger.approve(&account("alice"), &account("bob"), 5).unwrap();
        let err = ledger
            .transfer_from(&account("bob"), &account("alice"), &account("bob"), 6)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientAllowance {
                needed: 6,
                available: 5
            }
        );
    }

    #[test]
    fn failed_transfer_from_keeps_allowance() {
        let (mut ledger, _) = funded("alice", 10);
        ledger.approve(&account("alice"), &account("bob"), 50).unwrap();
        let err = ledger
            .transfer_from(&account("bob"), &account("alice"), &account("bob"), 20)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.allowance(&account("alice"), &account("bob")), 50);
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let (mut ledger, _) = funded("alice", 100);
        ledger
            .approve(&account("alice"), &account("bob"), UNLIMITED_ALLOWANCE)
            .unwrap();
        ledger
            .transfer_from(&account("bob"), &account("alice"), &account("bob"), 60)
            .unwrap();
        assert_eq!(
            ledger.allowance(&account("alice"), &account("bob")),
            UNLIMITED_ALLOWANCE
        );
    }

    #[test]
    fn approve_overwrites() {
        let mut ledger = TokenLedger::new();
        ledger.approve(&account("alice"), &account("bob"), 5).unwrap();
        ledger.approve(&account("alice"), &account("bob"), 2).unwrap();
        assert_eq!(ledger.allowance(&account("alice"), &account("bob")), 2);
        assert_eq!(
            ledger.approve(&account("alice"), &AccountId::null(), 1),
            Err(LedgerError::ZeroAddress)
        );
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    #[test]
    fn snapshot_restores_state() {
        let (mut ledger, _) = funded("alice", 100);
        ledger.transfer(&account("alice"), &account("bob"), 25).unwrap();
        ledger.approve(&account("bob"), &account("carol"), 7).unwrap();

        let restored = TokenLedger::from_snapshot(ledger.snapshot()).unwrap();
        assert_eq!(restored.balance_of(&account("alice")), 75);
        assert_eq!(restored.balance_of(&account("bob")), 25);
        assert_eq!(restored.allowance(&account("bob"), &account("carol")), 7);
        assert_eq!(restored.total_supply(), 100);
    }

    #[test]
    fn snapshot_with_wrong_supply_rejected() {
        let (ledger, _) = funded("alice", 100);
        let mut snap = ledger.snapshot();
        snap.total_supply = 99;
        assert_eq!(
            TokenLedger::from_snapshot(snap).unwrap_err(),
            LedgerError::SupplyMismatch { supply: 99, sum: 100 }
        );
    }

    #[test]
    fn snapshot_with_null_allowance_rejected() {
        let (ledger, _) = funded("alice", 100);
        let mut snap = ledger.snapshot();
        snap.allowances.push((AccountId::null(), account("bob"), 5));
        assert_eq!(
            TokenLedger::from_snapshot(snap).unwrap_err(),
            LedgerError::ZeroAddress
        );

        let mut snap = ledger.snapshot();
        snap.allowances.push((account("alice"), AccountId::null(), 5));
        assert_eq!(
            TokenLedger::from_snapshot(snap).unwrap_err(),
            LedgerError::ZeroAddress
        );
    }

    #[test]
    fn snapshot_with_duplicate_entries_rejected() {
        let (mut ledger, _) = funded("alice", 100);
        ledger.approve(&account("alice"), &account("bob"), 3).unwrap();

        let mut snap = ledger.snapshot();
        snap.balances.push((account("alice"), 0));
        assert!(matches!(
            TokenLedger::from_snapshot(snap),
            Err(LedgerError::DuplicateEntry(_))
        ));

        let mut snap = ledger.snapshot();
        snap.allowances.push((account("alice"), account("bob"), 9));
        assert!(matches!(
            TokenLedger::from_snapshot(snap),
            Err(LedgerError::DuplicateEntry(_))
        ));
    }
}
