//! Error types for attribute-access.
//!
//! All errors are strongly typed and propagated without panicking.
//! Every variant that concerns an identity carries its id, and attribute
//! level failures carry the offending attribute name.

use crate::ledger::LedgerError;

/// Access control error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Identity [{id}] not found: {reason}")]
    NotFound { id: String, reason: String },

    #[error("Identity [{0}] already exists")]
    AlreadyExists(String),

    #[error("Identity [{id}] has already been delegated attribute [{attribute}]")]
    AlreadyGranted { id: String, attribute: String },

    #[error("Identity [{id}] has not been delegated attribute [{attribute}]")]
    NotGranted { id: String, attribute: String },

    #[error("Identity [{id}] has not been delegated attribute [{attribute}], access denied")]
    AccessDenied { id: String, attribute: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AccessError {
    /// Build a `NotFound` error for an identity with no ledger entry.
    pub(crate) fn missing(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            reason: "no ledger entry".to_string(),
        }
    }

    /// Return `true` for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, AccessError>;
