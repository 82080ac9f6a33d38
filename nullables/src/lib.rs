//! Nullable infrastructure for deterministic testing.
//!
//! The engine's outside dependencies (time and the mint/execute authority)
//! sit behind traits in `concord-types`. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record how they were used
//!
//! Usage: swap real implementations for nullables in tests.

pub mod authority;
pub mod clock;

pub use authority::NullAuthority;
pub use clock::NullClock;
