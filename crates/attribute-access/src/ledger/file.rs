//! File-backed ledger — a single JSON document holding every entry.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "revision": 7,
//!     "entries": {
//!         "alice": { "version": 3, "value": "<base64 record bytes>" }
//!     }
//! }
//! ```
//!
//! A missing file is an empty ledger. The whole document is rewritten on
//! every commit through a sibling temp file renamed into place, so readers
//! see either the previous or the next revision. Commits from one process
//! are serialized; concurrent writes from multiple processes are not
//! coordinated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{validate_reads, CommitSummary, LedgerBackend, LedgerError, VersionedValue};

// ── File format constants ─────────────────────────────────────────────────────

const LEDGER_FILE_VERSION: u32 = 1;

// ── On-disk structures ────────────────────────────────────────────────────────

/// Top-level structure written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    /// Format version number.
    version: u32,
    /// Number of commits applied to this file.
    revision: u64,
    /// Stored entries by key.
    entries: BTreeMap<String, EntryFile>,
}

impl Default for LedgerFile {
    fn default() -> Self {
        Self {
            version: LEDGER_FILE_VERSION,
            revision: 0,
            entries: BTreeMap::new(),
        }
    }
}

/// One stored entry.
#[derive(Debug, Serialize, Deserialize)]
struct EntryFile {
    /// Entry version, bumped on every write.
    version: u64,
    /// Base64-encoded value bytes.
    value: String,
}

// ── FileLedger ────────────────────────────────────────────────────────────────

/// JSON-file ledger backend used by the CLI.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    commit_lock: Mutex<()>,
}

impl FileLedger {
    /// Open the ledger at `path`. The file is created on first commit.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidFormat` for a malformed file or
    /// `LedgerError::Io` for filesystem errors.
    pub fn keys(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self.load()?.entries.into_keys().collect())
    }

    /// Current ledger revision.
    pub fn revision(&self) -> Result<u64, LedgerError> {
        Ok(self.load()?.revision)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn load(&self) -> Result<LedgerFile, LedgerError> {
        if !self.path.exists() {
            return Ok(LedgerFile::default());
        }

        let bytes = std::fs::read(&self.path)?;
        let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFormat(format!(
                "failed to parse ledger file {}: {e}",
                self.path.display()
            ))
        })?;

        if file.version != LEDGER_FILE_VERSION {
            return Err(LedgerError::InvalidFormat(format!(
                "unsupported ledger file version {} in {}",
                file.version,
                self.path.display()
            )));
        }

        Ok(file)
    }

    fn store(&self, file: &LedgerFile) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(file)
            .map_err(|e| LedgerError::InvalidFormat(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Write `data` to `path` through a sibling temp file and `std::fs::rename`.
///
/// Creates the parent directory if it does not exist. Callers hold
/// `commit_lock`, so the temp file is never shared between writers.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

impl LedgerBackend for FileLedger {
    fn current_revision(&self) -> Result<u64, LedgerError> {
        self.revision()
    }

    fn read(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        let file = self.load()?;
        let Some(entry) = file.entries.get(key) else {
            return Ok(None);
        };

        let value = base64::engine::general_purpose::STANDARD
            .decode(&entry.value)
            .map_err(|e| {
                LedgerError::InvalidFormat(format!("entry [{key}] is not valid base64: {e}"))
            })?;

        Ok(Some(VersionedValue {
            version: entry.version,
            value,
        }))
    }

    fn apply(
        &self,
        reads: &BTreeMap<String, u64>,
        writes: BTreeMap<String, Vec<u8>>,
    ) -> Result<CommitSummary, LedgerError> {
        let _guard = self.commit_lock.lock();
        let mut file = self.load()?;

        validate_reads(reads, |key| file.entries.get(key).map_or(0, |e| e.version))?;

        let count = writes.len();
        for (key, value) in writes {
            let version = file.entries.get(&key).map_or(0, |e| e.version) + 1;
            let value = base64::engine::general_purpose::STANDARD.encode(value);
            file.entries.insert(key, EntryFile { version, value });
        }
        file.revision += 1;

        self.store(&file)?;

        Ok(CommitSummary {
            revision: file.revision,
            writes: count,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
