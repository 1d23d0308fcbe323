//! # Domain Errors
//!
//! Error taxonomy for the Consistency Engine.
//!
//! | Variant | Meaning | State changed |
//! |---------|---------|---------------|
//! | `Validation` | malformed, missing or empty input | never |
//! | `NotFound` | a referenced entity is absent | never |
//! | `Conflict` | the mutation would break an invariant | never |
//! | `Store` | the storage backend failed | possibly |

use std::fmt;
use thiserror::Error;
use tl_01_record_store::StoreError;

/// Which invariant a rejected mutation would have broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// Removing these categories would leave none.
    LastCategory,
    /// Administrators cannot be deleted.
    AdminDeletion,
    /// A group with that name exists.
    DuplicateGroup,
    /// A category with that type exists.
    DuplicateCategory,
    /// The caller already belongs to a group.
    AlreadyGrouped,
    /// No candidate survived partitioning.
    NoEligibleMembers,
    /// The group has a single member, which cannot be removed.
    LastMember,
    /// The aggregate changed between read and write.
    ConcurrentModification,
    /// Any other store-enforced invariant.
    Invariant(String),
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::LastCategory => write!(f, "at least one category must remain"),
            ConflictKind::AdminDeletion => write!(f, "cannot delete an admin"),
            ConflictKind::DuplicateGroup => write!(f, "a group with this name already exists"),
            ConflictKind::DuplicateCategory => write!(f, "a category with this type already exists"),
            ConflictKind::AlreadyGrouped => write!(f, "the caller is already in a group"),
            ConflictKind::NoEligibleMembers => write!(
                f,
                "all the member emails either do not exist or cannot be applied to this group"
            ),
            ConflictKind::LastMember => write!(f, "the group contains only one member"),
            ConflictKind::ConcurrentModification => {
                write!(f, "the entity was modified concurrently, retry the request")
            }
            ConflictKind::Invariant(detail) => write!(f, "{detail}"),
        }
    }
}

/// Consistency Engine error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input failed structural validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The mutation would violate an invariant.
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Shorthand for a `Validation` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }

    /// Whether the request was rejected for client-side reasons.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => EngineError::NotFound(what),
            StoreError::Duplicate(key) => EngineError::Conflict(ConflictKind::Invariant(format!(
                "duplicate {key}"
            ))),
            StoreError::VersionConflict { .. } => {
                EngineError::Conflict(ConflictKind::ConcurrentModification)
            }
            StoreError::InvariantViolation(detail) => {
                EngineError::Conflict(ConflictKind::Invariant(detail))
            }
            StoreError::Backend(detail) => EngineError::Store(detail),
        }
    }
}
