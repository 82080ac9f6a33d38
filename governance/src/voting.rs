//! Vote casting: one final vote per account per proposal, weighted by
//! delegation-resolved power captured at the moment of the vote.

use crate::delegation::DelegationGraph;
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalId};
use concord_ledger::TokenLedger;
use concord_types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};

/// A recorded vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub proposal: ProposalId,
    pub voter: AccountId,
    pub support: bool,
    /// Power added to the tally.
    pub power: u128,
}

pub struct VotingEngine;

impl VotingEngine {
    /// Cast `voter`'s vote on `proposal`.
    ///
    /// Later changes to balances or delegation do not touch a cast vote.
    pub fn cast_vote(
        &self,
        proposal: &mut Proposal,
        delegation: &DelegationGraph,
        ledger: &TokenLedger,
        voter: &AccountId,
        support: bool,
        now: Timestamp,
    ) -> Result<Ballot, GovernanceError> {
        proposal.ensure_pending()?;
        if now >= proposal.end_time {
            return Err(GovernanceError::VotingClosed(proposal.id));
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::DoubleVote(voter.to_string()));
        }
        let power = delegation.resolve_power(voter, ledger)?;
        let tally = if support {
            &mut proposal.for_votes
        } else {
            &mut proposal.against_votes
        };
        *tally = tally
            .checked_add(power)
            .ok_or(GovernanceError::ArithmeticOverflow)?;
        proposal.voters.insert(voter.clone());
        Ok(Ballot {
            proposal: proposal.id,
            voter: voter.clone(),
            support,
            power,
        })
    }
}
