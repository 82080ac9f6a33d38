//! Token-weighted governance for Concord.
//!
//! Three cooperating parts behind one [`GovernanceEngine`]:
//! - a [`TokenLedger`](concord_ledger::TokenLedger) whose balances are voting weight,
//! - a [`DelegationGraph`] where each account names at most one delegate and
//!   power resolution walks at most [`MAX_DELEGATION_DEPTH`](concord_types::MAX_DELEGATION_DEPTH) hops,
//! - a [`ProposalRegistry`] driving proposals from Pending to Executed or Canceled.
//!
//! Every operation is atomic: it either applies in full and appends its
//! [`Event`]s, or fails with no effect.

pub mod delegation;
pub mod engine;
pub mod error;
pub mod event;
pub mod execution;
pub mod operation;
pub mod proposal;
pub mod snapshot;
pub mod voting;

pub use delegation::DelegationGraph;
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use event::{Event, EventLog, EventRecord, MAX_RESUME_SEQ};
pub use execution::{support_ratio, ExecutionEngine, ExecutionOutcome};
pub use operation::{Operation, OperationResult};
pub use proposal::{Proposal, ProposalId, ProposalRegistry, ProposalState};
pub use snapshot::GovernanceSnapshot;
pub use voting::{Ballot, VotingEngine};
