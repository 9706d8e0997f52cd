// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid execution state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("Search spec not found: {0}")]
    SearchSpecNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
