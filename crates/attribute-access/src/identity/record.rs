//! Identity record — the serializable value object behind an `Identity`.
//!
//! The record is what the ledger stores. It is encoded with bincode inside
//! a small versioned envelope:
//!
//! ```text
//! RecordEnvelope {
//!     version: u32,              // RECORD_VERSION
//!     record: IdentityRecord {
//!         id: String,
//!         attributes: BTreeSet<String>,
//!     },
//! }
//! ```

use std::collections::BTreeSet;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};

// ── Format constants ──────────────────────────────────────────────────────────

const RECORD_VERSION: u32 = 1;

// ── IdentityId ────────────────────────────────────────────────────────────────

/// Unique identifier for an identity.
///
/// The id doubles as the ledger key of the identity's record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl IdentityId {
    /// Borrow the id as a ledger key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return `true` if the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IdentityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ── IdentityRecord ────────────────────────────────────────────────────────────

/// Persisted form of an identity: its id and the set of granted attributes.
///
/// Attribute membership is the only meaning an entry carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Identity id.
    pub id: IdentityId,
    /// Granted attribute names.
    pub attributes: BTreeSet<String>,
}

/// Envelope written to the ledger for each record.
#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    /// Format version number.
    version: u32,
    /// The stored record.
    record: IdentityRecord,
}

impl IdentityRecord {
    /// Create a record with no attributes.
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeSet::new(),
        }
    }

    /// Encode the record to ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::SerializationError` if bincode fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let envelope = RecordEnvelope {
            version: RECORD_VERSION,
            record: self.clone(),
        };
        bincode::serialize(&envelope).map_err(|e| AccessError::SerializationError(e.to_string()))
    }

    /// Decode a record from ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::DecodeError` for empty input, malformed bytes,
    /// bytes left over after the envelope, or an envelope version this build
    /// does not understand.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        if raw.is_empty() {
            return Err(AccessError::DecodeError("empty record".to_string()));
        }

        let envelope: RecordEnvelope = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
            .deserialize(raw)
            .map_err(|e| AccessError::DecodeError(e.to_string()))?;

        if envelope.version != RECORD_VERSION {
            return Err(AccessError::DecodeError(format!(
                "unsupported record version {} (expected {RECORD_VERSION})",
                envelope.version
            )));
        }

        Ok(envelope.record)
    }
}
