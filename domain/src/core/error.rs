//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// `NotFound` and `InvalidInput` are reported to callers as structured
/// error responses and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    /// Check if this error represents a missing session
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    /// Check if this error was caused by a malformed payload
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DomainError::InvalidInput(_))
    }
}
