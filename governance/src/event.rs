//! Append-only record of state changes for external observers.

use crate::proposal::ProposalId;
use concord_types::{deserialize_amount, AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state change, in the order it was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Tokens moved. `from` is null for a mint, `to` is null for a burn.
    Transfer {
        from: AccountId,
        to: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    /// An allowance was set or consumed; `amount` is the new value.
    Approval {
        owner: AccountId,
        spender: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        amount: u128,
    },
    Delegated {
        delegator: AccountId,
        delegate: AccountId,
    },
    Undelegated {
        delegator: AccountId,
        previous: AccountId,
    },
    ProposalCreated {
        id: ProposalId,
        proposer: AccountId,
        description: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    Voted {
        id: ProposalId,
        voter: AccountId,
        support: bool,
        #[serde(deserialize_with = "deserialize_amount")]
        power: u128,
    },
    ProposalExecuted {
        id: ProposalId,
        executor: AccountId,
        #[serde(deserialize_with = "deserialize_amount")]
        for_votes: u128,
        #[serde(deserialize_with = "deserialize_amount")]
        against_votes: u128,
    },
    ProposalCanceled {
        id: ProposalId,
        proposer: AccountId,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Approval { .. } => "approval",
            Self::Delegated { .. } => "delegated",
            Self::Undelegated { .. } => "undelegated",
            Self::ProposalCreated { .. } => "proposal_created",
            Self::Voted { .. } => "voted",
            Self::ProposalExecuted { .. } => "proposal_executed",
            Self::ProposalCanceled { .. } => "proposal_canceled",
        }
    }

    /// Subject identities an observer can filter on.
    pub fn indexed(&self) -> Vec<&AccountId> {
        match self {
            Self::Transfer { from, to, .. } => vec![from, to],
            Self::Approval { owner, spender, .. } => vec![owner, spender],
            Self::Delegated {
                delegator,
                delegate,
            } => vec![delegator, delegate],
            Self::Undelegated {
                delegator,
                previous,
            } => vec![delegator, previous],
            Self::ProposalCreated { proposer, .. } => vec![proposer],
            Self::Voted { voter, .. } => vec![voter],
            Self::ProposalExecuted { executor, .. } => vec![executor],
            Self::ProposalCanceled { proposer, .. } => vec![proposer],
        }
    }

    /// Whether `account` is one of the indexed subjects.
    pub fn involves(&self, account: &AccountId) -> bool {
        self.indexed().into_iter().any(|a| a == account)
    }
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: Event,
}

type Listener = Box<dyn Fn(&EventRecord) + Send + Sync>;

/// Highest sequence number a restored log may resume from, so that
/// numbering cannot run out of `u64` range.
pub const MAX_RESUME_SEQ: u64 = u64::MAX / 2;

/// Append-only event log with synchronous fan-out to subscribers.
///
/// Listeners run inline on the emitting call; keep them fast.
pub struct EventLog {
    records: Vec<EventRecord>,
    next_seq: u64,
    listeners: Vec<Listener>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// An empty log whose first record will carry `seq`.
    pub fn starting_at(seq: u64) -> Self {
        Self {
            records: Vec::new(),
            next_seq: seq,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&EventRecord) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn emit(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let record = EventRecord { seq, event };
        for listener in &self.listeners {
            listener(&record);
        }
        self.records.push(record);
        seq
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq < from);
        &self.records[start..]
    }

    /// Sequence number the next record will carry.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("records", &self.records.len())
            .field("next_seq", &self.next_seq)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
