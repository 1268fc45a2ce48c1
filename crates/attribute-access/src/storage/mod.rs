//! Storage layer for identity records.
//!
//! Translates `Identity` values to and from ledger entries through a
//! [`TransactionContext`](crate::ledger::TransactionContext).
//!
//! # Modules
//!
//! - [`identity_store`] — `IdentityStore` trait and the ledger-backed
//!   `LedgerIdentityStore`.

pub mod identity_store;

pub use identity_store::{IdentityStore, LedgerIdentityStore};
