//! # Requirements and Deny Reasons
//!
//! A `Requirement` is the capability an operation asks of the caller. Each
//! variant contributes only its predicate; decoding, pairing and rotation are
//! shared by all of them in the verifier pipeline.

use super::claims::Identity;
use serde::{Deserialize, Serialize};
use shared_types::{Email, Role};
use std::fmt;

/// Capability demanded by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any structurally valid, consistent token pair.
    Authenticated,
    /// The caller's username must equal the given one.
    Owner(String),
    /// The caller's role must be `Admin`.
    Admin,
    /// The caller's email must be one of the given set.
    GroupMember(Vec<Email>),
    /// At least one of the listed requirements must hold.
    AnyOf(Vec<Requirement>),
}

impl Requirement {
    /// Owner-or-admin, used by per-account record operations.
    pub fn owner_or_admin(username: impl Into<String>) -> Self {
        Requirement::AnyOf(vec![Requirement::Admin, Requirement::Owner(username.into())])
    }

    /// Member-or-admin, used for group reads.
    pub fn member_or_admin(members: Vec<Email>) -> Self {
        Requirement::AnyOf(vec![Requirement::Admin, Requirement::GroupMember(members)])
    }

    /// Evaluate the predicate against a verified identity.
    ///
    /// Returns the requirement-specific reason on failure.
    pub fn check(&self, identity: &Identity) -> Result<(), DenyReason> {
        match self {
            Requirement::Authenticated => Ok(()),
            Requirement::Owner(username) => {
                if identity.username == *username {
                    Ok(())
                } else {
                    Err(DenyReason::UsernameMismatch)
                }
            }
            Requirement::Admin => {
                if identity.role == Role::Admin.as_str() {
                    Ok(())
                } else {
                    Err(DenyReason::NotAdmin)
                }
            }
            Requirement::GroupMember(members) => {
                if members.iter().any(|m| m.as_str() == identity.email) {
                    Ok(())
                } else {
                    Err(DenyReason::NotInGroup)
                }
            }
            Requirement::AnyOf(options) => {
                let mut first_failure = DenyReason::NotAdmin;
                for (i, option) in options.iter().enumerate() {
                    match option.check(identity) {
                        Ok(()) => return Ok(()),
                        Err(reason) if i == 0 => first_failure = reason,
                        Err(_) => {}
                    }
                }
                Err(first_failure)
            }
        }
    }
}

/// Why a verification was denied, or `Authorized` when granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenyReason {
    /// Verification passed.
    Authorized,
    /// One of the two tokens was not supplied.
    MissingToken,
    /// A token failed to decode for a reason other than short-token expiry.
    DecodeError,
    /// A required claim is absent or empty.
    IncompleteClaims,
    /// The two tokens describe different principals.
    MismatchedIdentity,
    /// `Owner` predicate failed.
    UsernameMismatch,
    /// `Admin` predicate failed.
    NotAdmin,
    /// `GroupMember` predicate failed.
    NotInGroup,
    /// The long-lived token has expired; the caller must log in again.
    ReauthenticationRequired,
}

impl DenyReason {
    /// Whether the caller failed to authenticate at all.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            DenyReason::MissingToken
                | DenyReason::DecodeError
                | DenyReason::IncompleteClaims
                | DenyReason::MismatchedIdentity
                | DenyReason::ReauthenticationRequired
        )
    }

    /// Whether the caller authenticated but lacks the capability.
    pub fn is_capability_denied(&self) -> bool {
        matches!(
            self,
            DenyReason::UsernameMismatch | DenyReason::NotAdmin | DenyReason::NotInGroup
        )
    }

    /// Human-readable message for responses.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::Authorized => "Authorized",
            DenyReason::MissingToken => "Unauthorized",
            DenyReason::DecodeError => "Token could not be decoded",
            DenyReason::IncompleteClaims => "Token is missing required information",
            DenyReason::MismatchedIdentity => "Tokens do not belong to the same user",
            DenyReason::UsernameMismatch => "Token does not belong to the requested user",
            DenyReason::NotAdmin => "Administrator role required",
            DenyReason::NotInGroup => "Caller is not a member of the group",
            DenyReason::ReauthenticationRequired => "Perform login",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
