//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while building grading configuration.
///
/// Grading itself never fails; only the policy it runs with can be invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interval table must contain at least one entry")]
    EmptyIntervalTable,

    #[error("interval table must not decrease: entry {index} is {next} after {previous}")]
    DecreasingInterval { index: usize, previous: u32, next: u32 },

    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },
}
