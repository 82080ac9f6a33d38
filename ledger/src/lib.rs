//! Fungible token ledger.
//!
//! Balances, spender allowances and total supply, with checked arithmetic
//! throughout. Mint and burn are gated by an injected
//! [`AuthorityGate`](concord_types::AuthorityGate).

pub mod error;
pub mod ledger;
pub mod snapshot;

pub use error::LedgerError;
pub use ledger::{TokenLedger, UNLIMITED_ALLOWANCE};
pub use snapshot::LedgerSnapshot;
