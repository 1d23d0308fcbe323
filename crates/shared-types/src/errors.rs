//! # Error Types
//!
//! Defines error types and status classes used across subsystems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing an [`Email`](crate::Email).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    /// The address is an empty string.
    #[error("Email is an empty string")]
    Empty,

    /// The address does not match the email grammar.
    #[error("Email is not in a valid format: {0}")]
    Malformed(String),
}

/// HTTP-style outcome class handed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// The operation succeeded.
    Ok,
    /// The request was rejected; no state changed.
    ClientError,
    /// The caller is not authenticated or lacks the required capability.
    Unauthorized,
    /// The store failed.
    ServerError,
}

impl StatusClass {
    /// Conventional HTTP status code for this class.
    pub fn http_code(&self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::ClientError => 400,
            StatusClass::Unauthorized => 401,
            StatusClass::ServerError => 500,
        }
    }

    /// Whether this class denotes success.
    pub fn is_success(&self) -> bool {
        matches!(self, StatusClass::Ok)
    }
}
