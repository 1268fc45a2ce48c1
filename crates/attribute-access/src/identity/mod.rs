//! Identity model — the principal, its attributes, and its record format.
//!
//! The identity module provides the `Identity` entity and the
//! `IdentityRecord` value object it persists as.

pub mod entity;
pub mod record;

pub use entity::Identity;
pub use record::{IdentityId, IdentityRecord};
