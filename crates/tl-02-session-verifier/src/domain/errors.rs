//! # Domain Errors
//!
//! Error types for the Session Verifier subsystem.

use super::claims::TokenClaims;
use thiserror::Error;

/// Token decode and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature is valid but the token is past its expiry.
    #[error("Token expired at {}", .claims.exp)]
    Expired {
        /// The verified but stale payload.
        claims: Box<TokenClaims>,
    },

    /// The token is not three base64url segments of the expected shape.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// The MAC does not match the header and payload.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Claims could not be serialized when signing.
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Whether the failure is expiry rather than a structural problem.
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No signing secret supplied.
    #[error("Session signing secret is missing or empty")]
    MissingSecret,

    /// A variable failed to parse or is inconsistent.
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}
