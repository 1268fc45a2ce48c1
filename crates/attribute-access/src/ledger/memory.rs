//! In-memory ledger backend.
//!
//! `MemoryLedger` is a cloneable handle; clones share the same committed
//! state, so several threads can each run their own transactions against
//! one ledger.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{validate_reads, CommitSummary, LedgerBackend, LedgerError, VersionedValue};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, VersionedValue>,
    revision: u64,
    rejected: HashSet<String>,
}

/// Thread-safe in-memory ledger.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every future write to `key` with `LedgerError::Rejected`.
    pub fn reject_writes(&self, key: impl Into<String>) {
        self.state.write().rejected.insert(key.into());
    }

    /// Accept writes to `key` again.
    pub fn accept_writes(&self, key: &str) {
        self.state.write().rejected.remove(key);
    }

    /// Committed bytes for `key`, outside any transaction.
    pub fn committed(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().entries.get(key).map(|v| v.value.clone())
    }

    /// Committed version for `key` (0 if absent).
    pub fn version(&self, key: &str) -> u64 {
        self.state.read().entries.get(key).map_or(0, |v| v.version)
    }

    /// Number of commits that wrote at least one key.
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Return `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.read().entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl LedgerBackend for MemoryLedger {
    fn read(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        Ok(self.state.read().entries.get(key).cloned())
    }

    fn current_revision(&self) -> Result<u64, LedgerError> {
        Ok(self.revision())
    }

    fn admit(&self, key: &str) -> Result<(), LedgerError> {
        if self.state.read().rejected.contains(key) {
            return Err(LedgerError::Rejected {
                key: key.to_string(),
                reason: "writes to this key are refused by the ledger".to_string(),
            });
        }
        Ok(())
    }

    fn apply(
        &self,
        reads: &BTreeMap<String, u64>,
        writes: BTreeMap<String, Vec<u8>>,
    ) -> Result<CommitSummary, LedgerError> {
        let mut state = self.state.write();

        validate_reads(reads, |key| {
            state.entries.get(key).map_or(0, |v| v.version)
        })?;

        if let Some(key) = writes.keys().find(|k| state.rejected.contains(*k)) {
            return Err(LedgerError::Rejected {
                key: key.clone(),
                reason: "writes to this key are refused by the ledger".to_string(),
            });
        }

        let count = writes.len();
        for (key, value) in writes {
            let version = state.entries.get(&key).map_or(0, |v| v.version) + 1;
            state.entries.insert(key, VersionedValue { version, value });
        }
        state.revision += 1;

        Ok(CommitSummary {
            revision: state.revision,
            writes: count,
        })
    }
}
