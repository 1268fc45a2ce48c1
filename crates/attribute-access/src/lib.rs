//! attribute-access — Attribute-based access control over a ledger.
//!
//! Registers identities in a transactional key-value ledger, delegates and
//! revokes named attributes on them, and authenticates requests by checking
//! whether an identity currently holds a required attribute.

pub mod error;
pub mod identity;
pub mod ledger;
pub mod service;
pub mod storage;

// Re-export primary types
pub use error::{AccessError, Result};
pub use identity::{Identity, IdentityId, IdentityRecord};
pub use ledger::{
    CommitSummary, FileLedger, LedgerBackend, LedgerError, MemoryLedger, Transaction,
    TransactionContext,
};
pub use service::{
    parse_attributes, AccessControlService, Operation, OperationError, ServiceResult,
    ATTRIBUTE_SEPARATOR,
};
pub use storage::{IdentityStore, LedgerIdentityStore};
