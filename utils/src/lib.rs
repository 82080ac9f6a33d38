//! Shared utilities for Concord.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, LogFormat, LoggingError};
pub use time::format_duration;
