use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("the null account cannot take part in this operation")]
    ZeroAddress,

    #[error("account {0} is not authorized")]
    Unauthorized(String),

    #[error("arithmetic overflow in ledger update")]
    ArithmeticOverflow,

    #[error("arithmetic underflow in ledger update")]
    ArithmeticUnderflow,

    #[error("snapshot lists {0} more than once")]
    DuplicateEntry(String),

    #[error("snapshot supply {supply} does not match balance sum {sum}")]
    SupplyMismatch { supply: u128, sum: u128 },
}
