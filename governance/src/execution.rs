//! Proposal execution: the support-ratio check after the voting window and
//! the governance reward.

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalState};
use concord_ledger::TokenLedger;
use concord_types::{deserialize_amount, AccountId, AuthorityGate, Timestamp};
use serde::{Deserialize, Serialize};

/// What an execution attempt did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Threshold met: the proposal is Executed and `reward` was minted to the executor.
    Executed {
        #[serde(deserialize_with = "deserialize_amount")]
        ratio: u128,
        #[serde(deserialize_with = "deserialize_amount")]
        reward: u128,
    },
    /// Threshold missed: the proposal stays Pending.
    BelowThreshold {
        #[serde(deserialize_with = "deserialize_amount")]
        ratio: u128,
    },
    /// Nobody voted: treated as not passing, the proposal stays Pending.
    NoTurnout,
}

impl ExecutionOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

/// `for * 100 / (for + against)`, floored. `None` when no power was cast.
pub fn support_ratio(for_votes: u128, against_votes: u128) -> Result<Option<u128>, GovernanceError> {
    let total = for_votes
        .checked_add(against_votes)
        .ok_or(GovernanceError::ArithmeticOverflow)?;
    if total == 0 {
        return Ok(None);
    }
    let scaled = for_votes
        .checked_mul(100)
        .ok_or(GovernanceError::ArithmeticOverflow)?;
    Ok(Some(scaled / total))
}

pub struct ExecutionEngine;

impl ExecutionEngine {
    /// Attempt to execute `proposal` on behalf of `caller`.
    ///
    /// The reward is minted before the state changes, so a failed mint leaves
    /// both the ledger and the proposal untouched.
    pub fn execute(
        &self,
        proposal: &mut Proposal,
        ledger: &mut TokenLedger,
        authority: &dyn AuthorityGate,
        caller: &AccountId,
        min_support_pct: u8,
        now: Timestamp,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        if !authority.is_authorized(caller) {
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }
        proposal.ensure_pending()?;
        if now < proposal.end_time {
            return Err(GovernanceError::VotingNotYetClosed(proposal.id));
        }
        let ratio = match support_ratio(proposal.for_votes, proposal.against_votes)? {
            Some(ratio) => ratio,
            None => return Ok(ExecutionOutcome::NoTurnout),
        };
        if ratio < u128::from(min_support_pct) {
            return Ok(ExecutionOutcome::BelowThreshold { ratio });
        }
        let reward = proposal.for_votes;
        ledger.mint(authority, caller, caller, reward)?;
        proposal.state = ProposalState::Executed;
        Ok(ExecutionOutcome::Executed { ratio, reward })
    }
}
