//! Genesis configuration with TOML file support.

use anyhow::Context;
use concord_types::{AccountId, GovernanceParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An opening balance minted by the authority at genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub account: AccountId,
    /// TOML integers are 64-bit, so genesis amounts are too.
    pub amount: u64,
}

/// Everything needed to stand up an engine before the first call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisConfig {
    /// The account allowed to mint, burn and execute.
    pub authority: AccountId,

    #[serde(default)]
    pub params: GovernanceParams,

    #[serde(default)]
    pub allocations: Vec<Allocation>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GenesisConfig {
    /// Load and validate a genesis file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading genesis file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing genesis file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.authority.is_null() {
            anyhow::bail!("authority cannot be the null account");
        }
        self.params.validate()?;
        if let Some(a) = self.allocations.iter().find(|a| a.account.is_null()) {
            anyhow::bail!("allocation to the null account ({} tokens)", a.amount);
        }
        Ok(())
    }

    /// Sum of all allocations; this is the supply right after genesis.
    pub fn allocated_supply(&self) -> u128 {
        self.allocations.iter().map(|a| u128::from(a.amount)).sum()
    }
}
