//! Governance parameters.
//!
//! Loaded once at genesis and fixed for the lifetime of an engine. The
//! delegation depth bound is deliberately not a parameter, see
//! [`MAX_DELEGATION_DEPTH`].

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Number of delegate hops followed beyond the voter when resolving power.
pub const MAX_DELEGATION_DEPTH: usize = 5;

/// One week in seconds.
pub const SECS_PER_WEEK: u64 = 7 * 24 * 3600;

/// Tunable values of the proposal process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GovernanceParams {
    /// Minimum balance (raw units) needed to submit a proposal.
    #[serde(default = "default_proposal_threshold")]
    pub proposal_threshold: u64,

    /// Length of the voting window in seconds.
    #[serde(default = "default_voting_duration_secs")]
    pub voting_duration_secs: u64,

    /// Minimum share of "for" power (whole percent) for execution.
    #[serde(default = "default_min_support_pct")]
    pub min_support_pct: u8,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_proposal_threshold() -> u64 {
    100
}

fn default_voting_duration_secs() -> u64 {
    SECS_PER_WEEK
}

fn default_min_support_pct() -> u8 {
    50
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceParams {
    /// Check that the parameters describe a usable process.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.voting_duration_secs == 0 {
            return Err(TypesError::InvalidParam {
                name: "voting_duration_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.min_support_pct > 100 {
            return Err(TypesError::InvalidParam {
                name: "min_support_pct",
                reason: format!("{} exceeds 100", self.min_support_pct),
            });
        }
        Ok(())
    }

    /// Parse and validate parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, TypesError> {
        let params: Self = toml::from_str(s).map_err(|e| TypesError::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize the parameters to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, TypesError> {
        toml::to_string_pretty(self).map_err(|e| TypesError::Config(e.to_string()))
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            proposal_threshold: default_proposal_threshold(),
            voting_duration_secs: default_voting_duration_secs(),
            min_support_pct: default_min_support_pct(),
        }
    }
}
