//! # Claims
//!
//! `TokenClaims` is the wire payload; any identity field may be missing.
//! `Identity` is the checked form with every required claim present.

use serde::{Deserialize, Serialize};
use shared_types::Account;

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Account role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued-at, Unix seconds.
    #[serde(default)]
    pub iat: u64,
    /// Expiry, Unix seconds.
    pub exp: u64,
}

impl TokenClaims {
    /// Build the payload for an identity.
    pub fn for_identity(identity: &Identity, issued_at: u64, expires_at: u64) -> Self {
        Self {
            username: Some(identity.username.clone()),
            email: Some(identity.email.clone()),
            id: identity.id.clone(),
            role: Some(identity.role.clone()),
            iat: issued_at,
            exp: expires_at,
        }
    }

    /// Extract the identity if `username`, `email` and `role` are all present
    /// and non-empty.
    pub fn identity(&self) -> Option<Identity> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
        Some(Identity {
            username: present(&self.username)?,
            email: present(&self.email)?,
            id: self.id.clone(),
            role: present(&self.role)?,
        })
    }
}

/// The identity carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account username.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Account id, informational only.
    pub id: Option<String>,
    /// Account role.
    pub role: String,
}

impl Identity {
    /// The identity a freshly logged-in account receives.
    pub fn from_account(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.to_string(),
            id: Some(account.id.to_string()),
            role: account.role.to_string(),
        }
    }

    /// Whether two tokens describe the same principal.
    ///
    /// Compares username, email and role. The id is not part of the check.
    pub fn same_principal(&self, other: &Identity) -> bool {
        self.username == other.username && self.email == other.email && self.role == other.role
    }
}
