//! # Domain Errors
//!
//! Error types for the Record Store subsystem.

use shared_types::{Email, GroupMember};
use thiserror::Error;

/// Record store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// A conditional update observed a different aggregate version.
    #[error("Concurrent modification of {aggregate}: expected version {expected}, found {found}")]
    VersionConflict {
        /// Natural key of the aggregate.
        aggregate: String,
        /// Version the caller read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// The write would break a store-wide invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The storage backend failed.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A membership write against one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// Append members in order.
    Push(Vec<GroupMember>),
    /// Remove members with these emails.
    Pull(Vec<Email>),
}

impl MembershipChange {
    /// Number of emails touched by the change.
    pub fn len(&self) -> usize {
        match self {
            MembershipChange::Push(members) => members.len(),
            MembershipChange::Pull(emails) => emails.len(),
        }
    }

    /// True when the change touches nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
