//! Account identity type with `ccd_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// A Concord account identity, always prefixed with `ccd_`.
///
/// The body is opaque to the ledger: any non-empty string after the prefix
/// names an account. The all-zero body of [`AccountId::BODY_LEN`] characters
/// is reserved as the null identity and never holds a balance.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// The standard prefix for all account identities.
    pub const PREFIX: &'static str = "ccd_";

    /// Length of the canonical (hex-style) body.
    pub const BODY_LEN: usize = 40;

    /// Create an account id from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `ccd_`. Use [`AccountId::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "account id must start with ccd_");
        Self(s)
    }

    /// Parse an account id, rejecting strings without the prefix or body.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match s.strip_prefix(Self::PREFIX) {
            Some(body) if !body.is_empty() => Ok(Self(s)),
            _ => Err(TypesError::InvalidAccount(s)),
        }
    }

    /// The null identity (`ccd_000…0`).
    pub fn null() -> Self {
        Self(format!("{}{}", Self::PREFIX, "0".repeat(Self::BODY_LEN)))
    }

    /// Whether this is the null identity.
    pub fn is_null(&self) -> bool {
        let body = self.body();
        body.len() == Self::BODY_LEN && body.bytes().all(|b| b == b'0')
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the prefix.
    pub fn body(&self) -> &str {
        &self.0[Self::PREFIX.len()..]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::str::FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
