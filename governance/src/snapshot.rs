//! Serializable image of a whole governance engine for host-side persistence.

use crate::error::GovernanceError;
use crate::proposal::Proposal;
use concord_ledger::LedgerSnapshot;
use concord_types::{AccountId, GovernanceParams};
use serde::{Deserialize, Serialize};

/// Everything needed to rebuild a [`GovernanceEngine`](crate::GovernanceEngine),
/// except the authority gate, which the host supplies again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub version: u32,
    pub params: GovernanceParams,
    pub ledger: LedgerSnapshot,
    /// (delegator, delegate), sorted by delegator.
    pub delegations: Vec<(AccountId, AccountId)>,
    pub proposals: Vec<Proposal>,
    /// Sequence number of the next event, so numbering continues after restore.
    pub next_event_seq: u64,
}

impl GovernanceSnapshot {
    pub const VERSION: u32 = 1;

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Decode with bincode, refusing unknown versions.
    pub fn from_bytes(data: &[u8]) -> Result<Self, GovernanceError> {
        let snapshot: Self =
            bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        if snapshot.version != Self::VERSION {
            return Err(GovernanceError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}
