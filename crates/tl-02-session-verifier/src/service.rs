//! # Session Verifier Service
//!
//! Application service that implements `SessionVerificationApi`.
//!
//! ## Pipeline
//!
//! Every requirement kind runs through the same steps; only the predicate in
//! step 4 differs.
//!
//! 1. Both tokens present, short token decodes (or is merely expired),
//!    long token decodes
//! 2. Required claims present on both tokens
//! 3. Both tokens name the same principal
//! 4. Requirement predicate
//! 5. Rotation when only the short token expired

use crate::domain::claims::{Identity, TokenClaims};
use crate::domain::config::SessionConfig;
use crate::domain::errors::TokenError;
use crate::domain::outcome::{TokenPair, VerificationOutcome};
use crate::domain::requirement::{DenyReason, Requirement};
use crate::domain::token::TokenCodec;
use crate::ports::inbound::SessionVerificationApi;
use shared_types::{SystemTimeSource, TimeSource};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Stateless session verifier.
///
/// Holds only the injected configuration and clock, so one instance can be
/// shared across any number of concurrent requests.
pub struct SessionVerifier<C: TimeSource = SystemTimeSource> {
    config: SessionConfig,
    codec: TokenCodec,
    clock: C,
}

impl SessionVerifier<SystemTimeSource> {
    /// Create a verifier on the wall clock.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemTimeSource)
    }
}

impl<C: TimeSource> SessionVerifier<C> {
    /// Create a verifier with an explicit clock.
    pub fn with_clock(config: SessionConfig, clock: C) -> Self {
        let codec = TokenCodec::new(config.signing_secret.clone());
        Self {
            config,
            codec,
            clock,
        }
    }

    fn sign(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = TokenClaims::for_identity(identity, now, now.saturating_add(ttl.as_secs()));
        self.codec.sign(&claims)
    }

    /// Steps 1 through 5; `Err` carries the deny reason.
    fn run_pipeline(
        &self,
        short_token: Option<&str>,
        long_token: Option<&str>,
        requirement: &Requirement,
    ) -> Result<VerificationOutcome, DenyReason> {
        let (Some(short_token), Some(long_token)) = (non_empty(short_token), non_empty(long_token))
        else {
            return Err(DenyReason::MissingToken);
        };
        let now = self.clock.now();

        // `None` means the short token verified but has expired.
        let short_claims = match self.codec.decode(short_token, now) {
            Ok(claims) => Some(claims),
            Err(e) if e.is_expired() => None,
            Err(e) => {
                debug!("[tl-02] Short-lived token rejected: {}", e);
                return Err(DenyReason::DecodeError);
            }
        };

        let long_claims = match self.codec.decode(long_token, now) {
            Ok(claims) => claims,
            Err(e) if e.is_expired() => return Err(DenyReason::ReauthenticationRequired),
            Err(e) => {
                debug!("[tl-02] Long-lived token rejected: {}", e);
                return Err(DenyReason::DecodeError);
            }
        };

        match short_claims {
            Some(short_claims) => {
                let short_identity = short_claims.identity().ok_or(DenyReason::IncompleteClaims)?;
                let long_identity = long_claims.identity().ok_or(DenyReason::IncompleteClaims)?;
                if !short_identity.same_principal(&long_identity) {
                    return Err(DenyReason::MismatchedIdentity);
                }
                requirement.check(&short_identity)?;
                Ok(VerificationOutcome::granted(short_identity))
            }
            None => {
                let identity = long_claims.identity().ok_or(DenyReason::IncompleteClaims)?;
                requirement.check(&identity)?;

                let rotated = self.sign(&identity, self.config.access_ttl).map_err(|e| {
                    warn!("[tl-02] Failed to sign rotated token: {}", e);
                    DenyReason::DecodeError
                })?;
                info!(
                    username = %identity.username,
                    "[tl-02] Short-lived token rotated"
                );
                Ok(VerificationOutcome::rotated(identity, rotated))
            }
        }
    }
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

impl<C: TimeSource> SessionVerificationApi for SessionVerifier<C> {
    fn verify(
        &self,
        short_token: Option<&str>,
        long_token: Option<&str>,
        requirement: &Requirement,
    ) -> VerificationOutcome {
        match self.run_pipeline(short_token, long_token, requirement) {
            Ok(outcome) => outcome,
            Err(reason) => {
                debug!(?reason, "[tl-02] Verification denied");
                VerificationOutcome::denied(reason)
            }
        }
    }

    fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(identity, self.config.access_ttl)?,
            refresh_token: self.sign(identity, self.config.refresh_ttl)?,
        })
    }

    fn config(&self) -> &SessionConfig {
        &self.config
    }
}
