use crate::proposal::{ProposalId, ProposalState};
use concord_ledger::LedgerError;
use concord_types::TypesError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("insufficient balance to propose: have {have}, need {need}")]
    InsufficientThreshold { have: u128, need: u128 },

    #[error("proposal {id} is {state}, expected pending")]
    InvalidState { id: ProposalId, state: ProposalState },

    #[error("voting window for proposal {0} has closed")]
    VotingClosed(ProposalId),

    #[error("voting window for proposal {0} is still open")]
    VotingNotYetClosed(ProposalId),

    #[error("account {0} has already voted on this proposal")]
    DoubleVote(String),

    #[error("the null account cannot take part in delegation")]
    ZeroAddress,

    #[error("account {0} is not authorized")]
    Unauthorized(String),

    #[error("arithmetic overflow in governance computation")]
    ArithmeticOverflow,

    #[error("invalid parameters: {0}")]
    Params(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

impl From<TypesError> for GovernanceError {
    fn from(e: TypesError) -> Self {
        Self::Params(e.to_string())
    }
}
