//! Identity — a registered principal and its granted attributes.
//!
//! An `Identity` owns an [`IdentityRecord`] behind a read/write guard.
//! Reads take the shared guard, grants and revokes take the exclusive one,
//! and batch mutations hold the exclusive guard for the whole batch so a
//! check-then-act sequence sees one consistent attribute set.

use parking_lot::RwLock;

use crate::error::{AccessError, Result};

use super::record::{IdentityId, IdentityRecord};

/// In-memory projection of a persisted identity.
///
/// Instances are short-lived: load, mutate, store. Nothing caches them
/// across operations.
#[derive(Debug)]
pub struct Identity {
    record: RwLock<IdentityRecord>,
}

impl Identity {
    /// Create a new identity with an empty attribute set.
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self::from_record(IdentityRecord::new(id))
    }

    /// Wrap an existing record.
    pub fn from_record(record: IdentityRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }

    /// Build an identity from persisted record bytes.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::DecodeError` if the bytes are not a valid record.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        IdentityRecord::decode(raw).map(Self::from_record)
    }

    /// Return the identity id.
    pub fn id(&self) -> IdentityId {
        self.record.read().id.clone()
    }

    /// Return a snapshot of the underlying record.
    pub fn record(&self) -> IdentityRecord {
        self.record.read().clone()
    }

    /// Return the granted attributes, sorted.
    pub fn attributes(&self) -> Vec<String> {
        self.record.read().attributes.iter().cloned().collect()
    }

    /// Number of granted attributes.
    pub fn attribute_count(&self) -> usize {
        self.record.read().attributes.len()
    }

    /// Return `true` if `name` is currently granted.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.record.read().attributes.contains(name)
    }

    /// Grant a single attribute.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AlreadyGranted` if `name` is already present.
    pub fn grant_attribute(&self, name: &str) -> Result<()> {
        grant(&mut self.record.write(), name)
    }

    /// Revoke a single attribute.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotGranted` if `name` is absent.
    pub fn revoke_attribute(&self, name: &str) -> Result<()> {
        revoke(&mut self.record.write(), name)
    }

    /// Grant each name in order under one exclusive guard.
    ///
    /// Stops at the first failure. Names granted before it stay granted on
    /// this instance; the caller decides whether to persist.
    pub fn grant_attributes<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut record = self.record.write();
        names.iter().try_for_each(|name| grant(&mut record, name.as_ref()))
    }

    /// Revoke each name in order under one exclusive guard.
    ///
    /// Same partial-application behaviour as [`Identity::grant_attributes`].
    pub fn revoke_attributes<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut record = self.record.write();
        names
            .iter()
            .try_for_each(|name| revoke(&mut record, name.as_ref()))
    }

    /// Encode the identity to ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::SerializationError` if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.record.read().encode()
    }

    /// Overwrite this instance's fields, id included, from ledger bytes.
    ///
    /// On error the instance is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::DecodeError` if the bytes are not a valid record.
    pub fn deserialize(&self, raw: &[u8]) -> Result<()> {
        let decoded = IdentityRecord::decode(raw)?;
        *self.record.write() = decoded;
        Ok(())
    }
}

impl Clone for Identity {
    fn clone(&self) -> Self {
        Self::from_record(self.record())
    }
}

fn grant(record: &mut IdentityRecord, name: &str) -> Result<()> {
    if !record.attributes.insert(name.to_string()) {
        return Err(AccessError::AlreadyGranted {
            id: record.id.0.clone(),
            attribute: name.to_string(),
        });
    }
    Ok(())
}

fn revoke(record: &mut IdentityRecord, name: &str) -> Result<()> {
    if !record.attributes.remove(name) {
        return Err(AccessError::NotGranted {
            id: record.id.0.clone(),
            attribute: name.to_string(),
        });
    }
    Ok(())
}
