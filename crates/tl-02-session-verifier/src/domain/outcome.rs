//! Verification results and issued token pairs.

use super::claims::Identity;
use super::requirement::DenyReason;
use serde::{Deserialize, Serialize};

/// One-time notice shown to the client after a rotation.
pub const ROTATION_ADVISORY: &str =
    "Access token has been refreshed. Remember to copy the new one in the headers of subsequent calls";

/// Result of a single `verify` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Whether the requirement is satisfied.
    pub granted: bool,
    /// `Authorized` when granted, otherwise the first failing check.
    pub reason: DenyReason,
    /// A freshly signed short-lived token, present only after rotation.
    pub rotated_short_token: Option<String>,
    /// The verified identity, present when granted.
    pub identity: Option<Identity>,
}

impl VerificationOutcome {
    /// Granted without rotation.
    pub fn granted(identity: Identity) -> Self {
        Self {
            granted: true,
            reason: DenyReason::Authorized,
            rotated_short_token: None,
            identity: Some(identity),
        }
    }

    /// Granted on the strength of the long-lived token, with a new short one.
    pub fn rotated(identity: Identity, short_token: String) -> Self {
        Self {
            granted: true,
            reason: DenyReason::Authorized,
            rotated_short_token: Some(short_token),
            identity: Some(identity),
        }
    }

    /// Denied for `reason`.
    pub fn denied(reason: DenyReason) -> Self {
        Self {
            granted: false,
            reason,
            rotated_short_token: None,
            identity: None,
        }
    }

    /// Whether the short-lived token was replaced.
    pub fn was_rotated(&self) -> bool {
        self.rotated_short_token.is_some()
    }

    /// The advisory to surface once when a rotation happened.
    pub fn advisory(&self) -> Option<&'static str> {
        self.was_rotated().then_some(ROTATION_ADVISORY)
    }
}

/// A short-lived / long-lived token pair issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived token, sent with every request.
    pub access_token: String,
    /// Long-lived token, persisted on the account.
    pub refresh_token: String,
}
