//! Errors for the shared types: identity parsing and parameter validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("config error: {0}")]
    Config(String),
}
