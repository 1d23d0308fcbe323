//! Gateway error types and their status classes.

use shared_types::StatusClass;
use thiserror::Error;
use tl_01_record_store::{FilterError, StoreError};
use tl_02_session_verifier::{DenyReason, TokenError};
use tl_03_consistency_engine::EngineError;

/// Every failure an operation can surface to the transport layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(DenyReason),

    /// The caller is authenticated but lacks the capability.
    #[error("{0}")]
    CapabilityDenied(DenyReason),

    /// Request input was rejected before reaching the engine.
    #[error("{0}")]
    Validation(String),

    /// The engine rejected or failed the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Unexpected internal failure (signing, hashing, serialization).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Classify a verifier denial.
    pub fn from_denial(reason: DenyReason) -> Self {
        if reason.is_capability_denied() {
            GatewayError::CapabilityDenied(reason)
        } else {
            GatewayError::Unauthorized(reason)
        }
    }

    /// HTTP-style status class for this error.
    pub fn status(&self) -> StatusClass {
        match self {
            GatewayError::Unauthorized(_) | GatewayError::CapabilityDenied(_) => {
                StatusClass::Unauthorized
            }
            GatewayError::Validation(_) => StatusClass::ClientError,
            GatewayError::Engine(e) if e.is_client_error() => StatusClass::ClientError,
            GatewayError::Engine(_) | GatewayError::Internal(_) => StatusClass::ServerError,
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        GatewayError::Engine(err.into())
    }
}

impl From<FilterError> for GatewayError {
    fn from(err: FilterError) -> Self {
        GatewayError::Validation(err.to_string())
    }
}

impl From<TokenError> for GatewayError {
    fn from(err: TokenError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal(err.to_string())
    }
}
