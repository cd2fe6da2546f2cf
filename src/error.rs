//! Configuration errors
//!
//! The tick path has no error taxonomy; edge cases there are no-ops.
//! Only loading and validating a [`crate::SimConfig`] can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed into a config record.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
