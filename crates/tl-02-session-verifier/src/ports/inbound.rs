//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the Session Verifier.

use crate::domain::claims::Identity;
use crate::domain::config::SessionConfig;
use crate::domain::errors::TokenError;
use crate::domain::outcome::{TokenPair, VerificationOutcome};
use crate::domain::requirement::Requirement;

/// Primary Session Verification API.
///
/// Implementations are pure decision functions: they never read or write
/// the record store. Implementations must be thread-safe (`Send + Sync`).
pub trait SessionVerificationApi: Send + Sync {
    /// Verify a short-lived / long-lived token pair against `requirement`.
    ///
    /// If only the short-lived token has expired and the long-lived token
    /// still satisfies the requirement, the outcome is granted and carries a
    /// freshly signed short-lived token.
    fn verify(
        &self,
        short_token: Option<&str>,
        long_token: Option<&str>,
        requirement: &Requirement,
    ) -> VerificationOutcome;

    /// Sign a fresh token pair for `identity`.
    fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError>;

    /// Session configuration in effect.
    fn config(&self) -> &SessionConfig;
}
