//! # Outbound Ports (Driven Ports)
//!
//! Password hashing is behind a trait so tests and deployments can choose
//! their own cost parameters.

use thiserror::Error;

/// Password hashing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Password hashing failed: {0}")]
pub struct HashError(pub String);

/// Abstract interface for password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash a clear-text password into a self-describing string.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check a clear-text password against a stored hash.
    ///
    /// An unparsable hash never verifies.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
