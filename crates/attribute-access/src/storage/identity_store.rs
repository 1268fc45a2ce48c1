//! Identity persistence — create-once, update-requires-existing.
//!
//! Each identity is stored under its id as the ledger key, with the encoded
//! [`IdentityRecord`](crate::identity::IdentityRecord) as the value.
//!
//! The existence checks in `create` and `update` are advisory: they reject
//! obvious misuse early, but the ledger's own conflict detection at commit
//! time is what settles concurrent writers.

use crate::error::{AccessError, Result};
use crate::identity::{Identity, IdentityId};
use crate::ledger::TransactionContext;

/// Persistence boundary for identities.
pub trait IdentityStore {
    /// Load the identity stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` if there is no entry or the entry does
    /// not decode, or `AccessError::Ledger` for backend failures.
    fn get(&self, ctx: &mut dyn TransactionContext, id: &IdentityId) -> Result<Identity>;

    /// Store a new identity.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AlreadyExists` if an entry exists for the id.
    fn create(&self, ctx: &mut dyn TransactionContext, identity: &Identity) -> Result<()>;

    /// Overwrite an existing identity.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` if no entry currently exists for the id.
    fn update(&self, ctx: &mut dyn TransactionContext, identity: &Identity) -> Result<()>;

    /// Return `true` if an entry exists for `id`.
    fn exists(&self, ctx: &mut dyn TransactionContext, id: &IdentityId) -> Result<bool>;
}

/// Ledger-backed [`IdentityStore`].
///
/// Stateless: every call goes to the transaction context, nothing is cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerIdentityStore;

impl LedgerIdentityStore {
    /// Create a new store.
    pub fn new() -> Self {
        Self
    }
}

impl IdentityStore for LedgerIdentityStore {
    fn get(&self, ctx: &mut dyn TransactionContext, id: &IdentityId) -> Result<Identity> {
        log::debug!("loading identity [{id}]");

        let raw = ctx
            .get_state(id.as_str())?
            .ok_or_else(|| AccessError::missing(id.as_str()))?;

        Identity::from_bytes(&raw).map_err(|e| {
            log::warn!("identity [{id}] has an undecodable record: {e}");
            AccessError::NotFound {
                id: id.0.clone(),
                reason: format!("undecodable record: {e}"),
            }
        })
    }

    fn create(&self, ctx: &mut dyn TransactionContext, identity: &Identity) -> Result<()> {
        let id = identity.id();
        let bytes = identity.serialize()?;

        if self.exists(ctx, &id)? {
            return Err(AccessError::AlreadyExists(id.0));
        }

        log::debug!("storing new identity [{id}] ({} bytes)", bytes.len());
        ctx.put_state(id.as_str(), bytes)?;

        Ok(())
    }

    fn update(&self, ctx: &mut dyn TransactionContext, identity: &Identity) -> Result<()> {
        let id = identity.id();

        // Re-verify existence against the ledger, never a prior `get`.
        if !self.exists(ctx, &id)? {
            return Err(AccessError::NotFound {
                id: id.0,
                reason: "cannot update an identity that was never registered".to_string(),
            });
        }

        let bytes = identity.serialize()?;
        log::debug!("updating identity [{id}] ({} bytes)", bytes.len());
        ctx.put_state(id.as_str(), bytes)?;

        Ok(())
    }

    fn exists(&self, ctx: &mut dyn TransactionContext, id: &IdentityId) -> Result<bool> {
        Ok(ctx.get_state(id.as_str())?.is_some())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
