//! Ledger layer — the transactional key-value backend identities live in.
//!
//! The access control core only ever sees a [`TransactionContext`]: a handle
//! scoped to one unit of work with `get_state` and `put_state`. This module
//! also provides a small optimistic-concurrency transaction over any
//! [`LedgerBackend`], with two backends:
//!
//! - [`memory`] — `MemoryLedger`, shared in-process state for tests and
//!   embedders, with write-rejection fault injection.
//! - [`file`] — `FileLedger`, a JSON file used by the `aac` CLI.
//!
//! # Transaction semantics
//!
//! Reads observe the latest committed state and record the version they saw.
//! Writes are buffered. On commit the backend checks that every key read is
//! still at the version the transaction saw, and rejects the whole write set
//! with [`LedgerError::Conflict`] otherwise. A transaction dropped without
//! committing leaves no trace.

pub mod file;
pub mod memory;

use std::collections::BTreeMap;

pub use file::FileLedger;
pub use memory::MemoryLedger;

/// Ledger error types.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Conflicting write on key [{key}]: committed state changed since it was read")]
    Conflict { key: String },

    #[error("Write to key [{key}] rejected: {reason}")]
    Rejected { key: String, reason: String },

    #[error("Invalid ledger format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle scoping reads and writes to one external transaction.
///
/// An empty stored value is reported as absent.
pub trait TransactionContext {
    /// Read the committed value for `key`.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Stage `value` under `key`.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;
}

/// A committed value and the version it was written at.
///
/// Versions start at 1; an absent key reads as version 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub version: u64,
    pub value: Vec<u8>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Ledger revision after the commit. A commit with nothing staged
    /// reports the revision it observed.
    pub revision: u64,
    /// Number of keys written.
    pub writes: usize,
}

/// Storage engine under a [`Transaction`].
pub trait LedgerBackend {
    /// Read the committed value for `key`.
    fn read(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError>;

    /// Atomically validate `reads` (key → version seen) and apply `writes`.
    fn apply(
        &self,
        reads: &BTreeMap<String, u64>,
        writes: BTreeMap<String, Vec<u8>>,
    ) -> Result<CommitSummary, LedgerError>;

    /// Number of commits that wrote at least one key.
    fn current_revision(&self) -> Result<u64, LedgerError>;

    /// Decide whether a write to `key` may be staged at all.
    fn admit(&self, _key: &str) -> Result<(), LedgerError> {
        Ok(())
    }

    /// Open a transaction against this backend.
    fn begin(&self) -> Transaction<'_, Self>
    where
        Self: Sized,
    {
        Transaction::new(self)
    }
}

/// One unit of work against a [`LedgerBackend`].
pub struct Transaction<'a, B: LedgerBackend> {
    backend: &'a B,
    reads: BTreeMap<String, u64>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a, B: LedgerBackend> Transaction<'a, B> {
    /// Open a transaction with empty read and write sets.
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Validate and apply the staged writes.
    ///
    /// A transaction with nothing staged skips read-set validation and
    /// reports the backend's current revision.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Conflict` if a key read by this transaction was
    /// committed by someone else in the meantime, or any backend error.
    pub fn commit(self) -> Result<CommitSummary, LedgerError> {
        if self.writes.is_empty() {
            return Ok(CommitSummary {
                revision: self.backend.current_revision()?,
                writes: 0,
            });
        }

        let writes = self.writes.len();
        match self.backend.apply(&self.reads, self.writes) {
            Ok(summary) => {
                log::debug!(
                    "ledger commit: {} write(s) at revision {}",
                    writes,
                    summary.revision
                );
                Ok(summary)
            }
            Err(e) => {
                log::warn!("ledger commit failed: {e}");
                Err(e)
            }
        }
    }
}

impl<B: LedgerBackend> TransactionContext for Transaction<'_, B> {
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let entry = self.backend.read(key)?;
        let version = entry.as_ref().map_or(0, |v| v.version);
        self.reads.entry(key.to_string()).or_insert(version);

        Ok(entry.map(|v| v.value).filter(|value| !value.is_empty()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.backend.admit(key)?;
        self.writes.insert(key.to_string(), value);
        Ok(())
    }
}

/// Check `reads` against a committed-version lookup.
///
/// Shared by the backends' `apply` implementations.
pub(crate) fn validate_reads(
    reads: &BTreeMap<String, u64>,
    current_version: impl Fn(&str) -> u64,
) -> Result<(), LedgerError> {
    for (key, seen) in reads {
        if current_version(key) != *seen {
            return Err(LedgerError::Conflict { key: key.clone() });
        }
    }
    Ok(())
}
