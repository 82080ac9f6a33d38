//! Core governance engine: the operation surface over ledger, delegation
//! graph and proposal registry.
//!
//! The host calls one operation at a time (`&mut self`) and supplies the
//! current time. Each operation either applies completely, appending its
//! events, or fails with no effect and no events.

use crate::delegation::DelegationGraph;
use crate::error::GovernanceError;
use crate::event::{Event, EventLog, MAX_RESUME_SEQ};
use crate::execution::{ExecutionEngine, ExecutionOutcome};
use crate::operation::{Operation, OperationResult};
use crate::proposal::{Proposal, ProposalId, ProposalRegistry};
use crate::snapshot::GovernanceSnapshot;
use crate::voting::VotingEngine;
use concord_ledger::TokenLedger;
use concord_types::{AccountId, AuthorityGate, GovernanceParams, Timestamp};

pub struct GovernanceEngine<A: AuthorityGate> {
    params: GovernanceParams,
    authority: A,
    ledger: TokenLedger,
    delegation: DelegationGraph,
    proposals: ProposalRegistry,
    events: EventLog,
}

impl<A: AuthorityGate> GovernanceEngine<A> {
    /// An empty engine: no balances, no delegations, no proposals.
    pub fn new(params: GovernanceParams, authority: A) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            params,
            authority,
            ledger: TokenLedger::new(),
            delegation: DelegationGraph::new(),
            proposals: ProposalRegistry::new(),
            events: EventLog::new(),
        })
    }

    /// Rebuild an engine from a snapshot. The event log restarts empty but
    /// keeps its numbering.
    pub fn from_snapshot(
        snapshot: GovernanceSnapshot,
        authority: A,
    ) -> Result<Self, GovernanceError> {
        snapshot.params.validate()?;
        if snapshot.next_event_seq > MAX_RESUME_SEQ {
            return Err(GovernanceError::Snapshot(format!(
                "event sequence {} is out of range",
                snapshot.next_event_seq
            )));
        }
        let engine = Self {
            params: snapshot.params,
            authority,
            ledger: TokenLedger::from_snapshot(snapshot.ledger)?,
            delegation: DelegationGraph::from_edges(snapshot.delegations)?,
            proposals: ProposalRegistry::from_proposals(snapshot.proposals)?,
            events: EventLog::starting_at(snapshot.next_event_seq),
        };
        tracing::info!(
            accounts = engine.ledger.accounts().count(),
            delegations = engine.delegation.len(),
            proposals = engine.proposals.len(),
            "governance state restored"
        );
        Ok(engine)
    }

    pub fn snapshot(&self) -> GovernanceSnapshot {
        GovernanceSnapshot {
            version: GovernanceSnapshot::VERSION,
            params: self.params.clone(),
            ledger: self.ledger.snapshot(),
            delegations: self.delegation.edges(),
            proposals: self.proposals.to_vec(),
            next_event_seq: self.events.next_seq(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn delegation(&self) -> &DelegationGraph {
        &self.delegation
    }

    pub fn proposals(&self) -> &ProposalRegistry {
        &self.proposals
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals.get(id)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Register an observer; it sees every event emitted from now on.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&crate::event::EventRecord) + Send + Sync + 'static,
    ) {
        self.events.subscribe(listener);
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    /// Voting power `account` would cast right now.
    pub fn voting_power(&self, account: &AccountId) -> Result<u128, GovernanceError> {
        self.delegation.resolve_power(account, &self.ledger)
    }

    // ── Proposals ───────────────────────────────────────────────────────

    pub fn propose(
        &mut self,
        caller: &AccountId,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let description = description.into();
        let balance = self.ledger.balance_of(caller);
        let id = self
            .proposals
            .propose(caller, balance, description.clone(), &self.params, now)
            .inspect_err(|e| tracing::debug!(%caller, error = %e, "propose rejected"))?;
        let proposal = self.proposals.get(id)?;
        let (start_time, end_time) = (proposal.start_time, proposal.end_time);
        tracing::info!(proposal = id, proposer = %caller, %end_time, "proposal created");
        self.events.emit(Event::ProposalCreated {
            id,
            proposer: caller.clone(),
            description,
            start_time,
            end_time,
        });
        Ok(id)
    }

    /// Cast `caller`'s vote. Returns the power recorded.
    pub fn vote(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        support: bool,
        now: Timestamp,
    ) -> Result<u128, GovernanceError> {
        let proposal = self.proposals.get_mut(id)?;
        let ballot = VotingEngine
            .cast_vote(proposal, &self.delegation, &self.ledger, caller, support, now)
            .inspect_err(|e| tracing::debug!(proposal = id, voter = %caller, error = %e, "vote rejected"))?;
        tracing::info!(
            proposal = id,
            voter = %caller,
            support,
            power = %ballot.power,
            "vote recorded"
        );
        self.events.emit(Event::Voted {
            id,
            voter: ballot.voter,
            support,
            power: ballot.power,
        });
        Ok(ballot.power)
    }

    /// Close a proposal after its window. Authority only.
    pub fn execute_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        if !self.authority.is_authorized(caller) {
            tracing::debug!(proposal = id, %caller, "execute rejected: not the authority");
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }
        let proposal = self.proposals.get_mut(id)?;
        let outcome = ExecutionEngine
            .execute(
                proposal,
                &mut self.ledger,
                &self.authority,
                caller,
                self.params.min_support_pct,
                now,
            )
            .inspect_err(|e| tracing::debug!(proposal = id, %caller, error = %e, "execute rejected"))?;
        let (for_votes, against_votes) = (proposal.for_votes, proposal.against_votes);
        match &outcome {
            ExecutionOutcome::Executed { ratio, reward } => {
                tracing::info!(proposal = id, %ratio, %reward, executor = %caller, "proposal executed");
                self.events.emit(Event::Transfer {
                    from: AccountId::null(),
                    to: caller.clone(),
                    amount: *reward,
                });
                self.events.emit(Event::ProposalExecuted {
                    id,
                    executor: caller.clone(),
                    for_votes,
                    against_votes,
                });
            }
            ExecutionOutcome::BelowThreshold { ratio } => {
                tracing::warn!(
                    proposal = id,
                    %ratio,
                    min = self.params.min_support_pct,
                    "support below threshold, proposal stays pending"
                );
            }
            ExecutionOutcome::NoTurnout => {
                tracing::warn!(proposal = id, "no votes cast, proposal stays pending");
            }
        }
        Ok(outcome)
    }

    /// Withdraw a Pending proposal. Proposer only.
    pub fn cancel_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
    ) -> Result<(), GovernanceError> {
        self.proposals
            .cancel(caller, id)
            .inspect_err(|e| tracing::debug!(proposal = id, %caller, error = %e, "cancel rejected"))?;
        tracing::info!(proposal = id, proposer = %caller, "proposal canceled");
        self.events.emit(Event::ProposalCanceled {
            id,
            proposer: caller.clone(),
        });
        Ok(())
    }

    // ── Delegation ──────────────────────────────────────────────────────

    pub fn delegate(&mut self, caller: &AccountId, to: &AccountId) -> Result<(), GovernanceError> {
        let previous = self
            .delegation
            .delegate(caller, to)
            .inspect_err(|e| tracing::debug!(%caller, %to, error = %e, "delegate rejected"))?;
        tracing::info!(delegator = %caller, delegate = %to, ?previous, "delegation set");
        self.events.emit(Event::Delegated {
            delegator: caller.clone(),
            delegate: to.clone(),
        });
        Ok(())
    }

    /// Return to self-voting. A no-op (and no event) without a delegation.
    pub fn undelegate(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        if let Some(previous) = self.delegation.undelegate(caller) {
            tracing::info!(delegator = %caller, %previous, "delegation removed");
            self.events.emit(Event::Undelegated {
                delegator: caller.clone(),
                previous,
            });
        }
        Ok(())
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<bool, GovernanceError> {
        self.ledger
            .transfer(caller, to, amount)
            .inspect_err(|e| tracing::debug!(from = %caller, %to, %amount, error = %e, "transfer rejected"))?;
        tracing::debug!(from = %caller, %to, %amount, "transfer");
        self.events.emit(Event::Transfer {
            from: caller.clone(),
            to: to.clone(),
            amount,
        });
        Ok(true)
    }

    pub fn approve(
        &mut self,
        caller: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<bool, GovernanceError> {
        self.ledger
            .approve(caller, spender, amount)
            .inspect_err(|e| tracing::debug!(owner = %caller, %spender, error = %e, "approve rejected"))?;
        self.events.emit(Event::Approval {
            owner: caller.clone(),
            spender: spender.clone(),
            amount,
        });
        Ok(true)
    }

    /// Move `from`'s tokens using `caller`'s allowance.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<bool, GovernanceError> {
        let before = self.ledger.allowance(from, caller);
        let remaining = self
            .ledger
            .transfer_from(caller, from, to, amount)
            .inspect_err(|e| tracing::debug!(spender = %caller, %from, %to, %amount, error = %e, "transfer_from rejected"))?;
        tracing::debug!(spender = %caller, %from, %to, %amount, "transfer_from");
        if remaining != before {
            self.events.emit(Event::Approval {
                owner: from.clone(),
                spender: caller.clone(),
                amount: remaining,
            });
        }
        self.events.emit(Event::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(true)
    }

    /// Create tokens. Authority only.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), GovernanceError> {
        self.ledger
            .mint(&self.authority, caller, account, amount)
            .inspect_err(|e| tracing::debug!(%caller, %account, %amount, error = %e, "mint rejected"))?;
        tracing::info!(%account, %amount, supply = %self.ledger.total_supply(), "minted");
        self.events.emit(Event::Transfer {
            from: AccountId::null(),
            to: account.clone(),
            amount,
        });
        Ok(())
    }

    /// Destroy tokens. Authority only.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), GovernanceError> {
        self.ledger
            .burn(&self.authority, caller, account, amount)
            .inspect_err(|e| tracing::debug!(%caller, %account, %amount, error = %e, "burn rejected"))?;
        tracing::info!(%account, %amount, supply = %self.ledger.total_supply(), "burned");
        self.events.emit(Event::Transfer {
            from: account.clone(),
            to: AccountId::null(),
            amount,
        });
        Ok(())
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Apply one [`Operation`] on behalf of `caller`.
    pub fn apply(
        &mut self,
        caller: &AccountId,
        op: Operation,
        now: Timestamp,
    ) -> Result<OperationResult, GovernanceError> {
        let result = match op {
            Operation::Propose { description } => OperationResult::Proposed {
                id: self.propose(caller, description, now)?,
            },
            Operation::Vote { proposal, support } => OperationResult::Voted {
                power: self.vote(caller, proposal, support, now)?,
            },
            Operation::Execute { proposal } => {
                OperationResult::Execution(self.execute_proposal(caller, proposal, now)?)
            }
            Operation::Cancel { proposal } => {
                self.cancel_proposal(caller, proposal)?;
                OperationResult::Accepted
            }
            Operation::Delegate { to } => {
                self.delegate(caller, &to)?;
                OperationResult::Accepted
            }
            Operation::Undelegate => {
                self.undelegate(caller)?;
                OperationResult::Accepted
            }
            Operation::Transfer { to, amount } => {
                self.transfer(caller, &to, amount)?;
                OperationResult::Accepted
            }
            Operation::Approve { spender, amount } => {
                self.approve(caller, &spender, amount)?;
                OperationResult::Accepted
            }
            Operation::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, &from, &to, amount)?;
                OperationResult::Accepted
            }
            Operation::Mint { account, amount } => {
                self.mint(caller, &account, amount)?;
                OperationResult::Accepted
            }
            Operation::Burn { account, amount } => {
                self.burn(caller, &account, amount)?;
                OperationResult::Accepted
            }
        };
        Ok(result)
    }
}
