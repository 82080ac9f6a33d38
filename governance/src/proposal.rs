//! Governance proposals, their lifecycle, and the append-only registry.
//!
//! ```text
//! Pending ──execute (threshold met, after end)──▶ Executed
//!    │
//!    └──────cancel (proposer only)──────────────▶ Canceled
//! ```
//!
//! A proposal whose execution attempt misses the support threshold stays
//! Pending and may be attempted again.

use crate::error::GovernanceError;
use concord_types::{AccountId, GovernanceParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Index of a proposal in the registry; ids are never reused.
pub type ProposalId = u64;

/// Lifecycle state of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Accepting votes until `end_time`, then awaiting execution.
    Pending,
    /// Threshold met and executed. Terminal.
    Executed,
    /// Withdrawn by its proposer. Terminal.
    Canceled,
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::Canceled => "canceled",
        };
        f.write_str(name)
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub description: String,
    /// Who proposed it; the only account allowed to cancel.
    pub proposer: AccountId,
    pub start_time: Timestamp,
    /// First instant at which votes are refused and execution is allowed.
    pub end_time: Timestamp,
    pub for_votes: u128,
    pub against_votes: u128,
    pub state: ProposalState,
    /// Accounts that have voted. Only grows.
    pub voters: BTreeSet<AccountId>,
}

impl Proposal {
    /// Whether a vote cast at `now` would be accepted, ignoring who casts it.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.state == ProposalState::Pending && now < self.end_time
    }

    pub fn has_voted(&self, account: &AccountId) -> bool {
        self.voters.contains(account)
    }

    pub(crate) fn ensure_pending(&self) -> Result<(), GovernanceError> {
        if self.state.is_terminal() {
            return Err(GovernanceError::InvalidState {
                id: self.id,
                state: self.state,
            });
        }
        Ok(())
    }
}

/// Ordered, append-only collection of proposals.
#[derive(Clone, Debug, Default)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry, requiring each proposal's id to equal its position.
    pub fn from_proposals(proposals: Vec<Proposal>) -> Result<Self, GovernanceError> {
        for (index, proposal) in proposals.iter().enumerate() {
            if proposal.id != index as ProposalId {
                return Err(GovernanceError::Snapshot(format!(
                    "proposal at position {} carries id {}",
                    index, proposal.id
                )));
            }
        }
        Ok(Self { proposals })
    }

    /// Append a new Pending proposal.
    ///
    /// `proposer_balance` is the proposer's ledger balance at `now`.
    pub fn propose(
        &mut self,
        proposer: &AccountId,
        proposer_balance: u128,
        description: String,
        params: &GovernanceParams,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let need = u128::from(params.proposal_threshold);
        if proposer_balance < need {
            return Err(GovernanceError::InsufficientThreshold {
                have: proposer_balance,
                need,
            });
        }
        let end_time = now
            .checked_add_secs(params.voting_duration_secs)
            .ok_or(GovernanceError::ArithmeticOverflow)?;
        let id = self.proposals.len() as ProposalId;
        self.proposals.push(Proposal {
            id,
            description,
            proposer: proposer.clone(),
            start_time: now,
            end_time,
            for_votes: 0,
            against_votes: 0,
            state: ProposalState::Pending,
            voters: BTreeSet::new(),
        });
        Ok(id)
    }

    /// Withdraw a Pending proposal. Only its proposer may do so.
    pub fn cancel(&mut self, caller: &AccountId, id: ProposalId) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        proposal.ensure_pending()?;
        if proposal.proposer != *caller {
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }
        proposal.state = ProposalState::Canceled;
        Ok(())
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.proposals.get(i))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> + '_ {
        self.proposals.iter()
    }

    /// Proposals still in the Pending state.
    pub fn pending(&self) -> impl Iterator<Item = &Proposal> + '_ {
        self.proposals
            .iter()
            .filter(|p| !p.state.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub(crate) fn to_vec(&self) -> Vec<Proposal> {
        self.proposals.clone()
    }
}
