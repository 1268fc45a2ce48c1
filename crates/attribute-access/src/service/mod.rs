//! Access control service — register, delegate, revoke, authenticate.
//!
//! The service holds no state of its own beyond its store. Every call runs
//! inside the caller's transaction context: validate input, load or build
//! an `Identity`, mutate or query it, and write it back only when the whole
//! request succeeded.
//!
//! Failures come back as [`OperationError`], which names the operation and
//! identity and wraps the underlying [`AccessError`].

pub mod parse;

use crate::error::AccessError;
use crate::identity::{Identity, IdentityId};
use crate::ledger::TransactionContext;
use crate::storage::{IdentityStore, LedgerIdentityStore};

pub use parse::{parse_attributes, ATTRIBUTE_SEPARATOR};

// ── Operation errors ──────────────────────────────────────────────────────────

/// Public operations exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Delegate,
    Revoke,
    Authenticate,
    Inspect,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Register => "register",
            Self::Delegate => "delegate",
            Self::Revoke => "revoke",
            Self::Authenticate => "authenticate",
            Self::Inspect => "inspect",
        };
        f.write_str(name)
    }
}

/// A failed service call with its operation and identity attached.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed for identity [{identity}]: {source}")]
pub struct OperationError {
    pub operation: Operation,
    pub identity: String,
    #[source]
    pub source: AccessError,
}

impl OperationError {
    /// The underlying error, for matching on its variant.
    pub fn kind(&self) -> &AccessError {
        &self.source
    }
}

/// Result alias for service calls.
pub type ServiceResult<T> = std::result::Result<T, OperationError>;

// ── AccessControlService ──────────────────────────────────────────────────────

/// Attribute-based access control over an [`IdentityStore`].
#[derive(Debug, Default, Clone)]
pub struct AccessControlService<S: IdentityStore = LedgerIdentityStore> {
    store: S,
}

impl<S: IdentityStore> AccessControlService<S> {
    /// Create a service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new identity with no attributes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id, `AlreadyExists` if the id is taken,
    /// or a wrapped ledger error.
    pub fn register_user(&self, ctx: &mut dyn TransactionContext, id: &str) -> ServiceResult<()> {
        let op = Operation::Register;
        require_id(op, id)?;

        let identity = Identity::new(id);
        self.store
            .create(ctx, &identity)
            .map_err(|e| fail(op, id, e))?;

        log::info!("registered identity [{id}]");
        Ok(())
    }

    /// Grant every attribute in `attrs` (`;`-separated) to `id`.
    ///
    /// Nothing is written unless every grant succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id, `NotFound` for an unknown identity,
    /// `AlreadyGranted` naming the first attribute already held, or a
    /// wrapped ledger error.
    pub fn delegate_attributes(
        &self,
        ctx: &mut dyn TransactionContext,
        id: &str,
        attrs: &str,
    ) -> ServiceResult<()> {
        let op = Operation::Delegate;
        require_id(op, id)?;

        let names = parse_attributes(attrs);
        let identity = self.load(op, ctx, id)?;
        identity
            .grant_attributes(&names)
            .map_err(|e| fail(op, id, e))?;
        self.store
            .update(ctx, &identity)
            .map_err(|e| fail(op, id, e))?;

        log::info!("delegated {names:?} to identity [{id}]");
        Ok(())
    }

    /// Revoke every attribute in `attrs` (`;`-separated) from `id`.
    ///
    /// Nothing is written unless every revoke succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id, `NotFound` for an unknown identity,
    /// `NotGranted` naming the first attribute not held, or a wrapped
    /// ledger error.
    pub fn revoke_attributes(
        &self,
        ctx: &mut dyn TransactionContext,
        id: &str,
        attrs: &str,
    ) -> ServiceResult<()> {
        let op = Operation::Revoke;
        require_id(op, id)?;

        let names = parse_attributes(attrs);
        let identity = self.load(op, ctx, id)?;
        identity
            .revoke_attributes(&names)
            .map_err(|e| fail(op, id, e))?;
        self.store
            .update(ctx, &identity)
            .map_err(|e| fail(op, id, e))?;

        log::info!("revoked {names:?} from identity [{id}]");
        Ok(())
    }

    /// Succeed iff `id` currently holds `attr`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id or attribute, `NotFound` for an unknown
    /// identity, `AccessDenied` if the attribute is not held.
    pub fn authenticate(
        &self,
        ctx: &mut dyn TransactionContext,
        id: &str,
        attr: &str,
    ) -> ServiceResult<()> {
        let op = Operation::Authenticate;
        require_id(op, id)?;
        if attr.is_empty() {
            return Err(fail(
                op,
                id,
                AccessError::InvalidInput("attribute should not be empty".to_string()),
            ));
        }

        let identity = self.load(op, ctx, id)?;
        if identity.has_attribute(attr) {
            return Ok(());
        }

        log::warn!("access denied: identity [{id}] lacks attribute [{attr}]");
        Err(fail(
            op,
            id,
            AccessError::AccessDenied {
                id: id.to_string(),
                attribute: attr.to_string(),
            },
        ))
    }

    /// Load the current state of `id` without modifying it.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty id, `NotFound` for an unknown identity.
    pub fn inspect(&self, ctx: &mut dyn TransactionContext, id: &str) -> ServiceResult<Identity> {
        let op = Operation::Inspect;
        require_id(op, id)?;
        self.load(op, ctx, id)
    }

    fn load(
        &self,
        op: Operation,
        ctx: &mut dyn TransactionContext,
        id: &str,
    ) -> ServiceResult<Identity> {
        self.store
            .get(ctx, &IdentityId::from(id))
            .map_err(|e| fail(op, id, e))
    }
}

fn require_id(op: Operation, id: &str) -> ServiceResult<()> {
    if id.is_empty() {
        return Err(fail(
            op,
            id,
            AccessError::InvalidInput("identity id should not be empty".to_string()),
        ));
    }
    Ok(())
}

fn fail(operation: Operation, id: &str, source: AccessError) -> OperationError {
    OperationError {
        operation,
        identity: id.to_string(),
        source,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
