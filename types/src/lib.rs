//! Fundamental types for Concord.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, wire amounts, timestamps and the clock seam, the authority capability,
//! and governance parameters.

pub mod address;
pub mod amount;
pub mod authority;
pub mod error;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::deserialize_amount;
pub use authority::{AuthorityGate, SingleAuthority};
pub use error::TypesError;
pub use params::{GovernanceParams, MAX_DELEGATION_DEPTH, SECS_PER_WEEK};
pub use time::{Clock, SystemClock, Timestamp};
