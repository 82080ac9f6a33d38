//! Ledger snapshots for host-side persistence.

use concord_types::AccountId;
use serde::{Deserialize, Serialize};

/// Sorted, serializable image of a [`TokenLedger`](crate::TokenLedger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// (account, balance), non-zero balances only.
    pub balances: Vec<(AccountId, u128)>,
    /// (owner, spender, allowance).
    pub allowances: Vec<(AccountId, AccountId, u128)>,
    pub total_supply: u128,
}
