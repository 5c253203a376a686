//! Error handling for the grading service

use thiserror::Error;
use vocab_core::ConfigError;

/// Service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Version conflict on {record}: expected {expected}, found {found}")]
    VersionConflict {
        record: String,
        expected: u64,
        found: u64,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Stable error identifier for transports layered on top.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Database(_) => "database_error",
            ServiceError::Migration(_) => "migration_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::VersionConflict { .. } => "conflict",
            ServiceError::Config(_) => "config_error",
        }
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
