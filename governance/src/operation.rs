//! Wire form of the operation surface, so a host can drive the engine from a
//! stream of calls.

use crate::execution::ExecutionOutcome;
use crate::proposal::ProposalId;
use concord_types::{deserialize_amount, AccountId};
use serde::{Deserialize, Serialize};

/// One externally invoked operation. The caller is supplied alongside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Propose {
        description: String,
    },
    Vote {
        proposal: ProposalId,
        support: bool,
    },
    Execute {
        proposal: ProposalId,
    },
    Cancel {
        proposal: ProposalId,
    },
    Delegate {
        to: AccountId,
    },
    Undelegate,
    Transfer {
        to: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    Approve {
        spender: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    TransferFrom {
        from: AccountId,
        to: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    Mint {
        account: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    Burn {
        account: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Propose { .. } => "propose",
            Self::Vote { .. } => "vote",
            Self::Execute { .. } => "execute",
            Self::Cancel { .. } => "cancel",
            Self::Delegate { .. } => "delegate",
            Self::Undelegate => "undelegate",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
        }
    }
}

/// Successful result of an [`Operation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResult {
    Proposed { id: ProposalId },
    Voted { power: u128 },
    Execution(ExecutionOutcome),
    /// Operations with nothing to report beyond success.
    Accepted,
}
