//! # Core Domain Entities
//!
//! Defines the record-store entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `Account`, `AccountId`, `Role`
//! - **Membership**: `Group`, `GroupMember`
//! - **Ledger**: `Category`, `Record`, `RecordId`

use crate::email::Email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Stable identifier of an account, used only for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Privilege level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Ordinary user.
    #[default]
    Regular,
    /// Administrator.
    Admin,
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => "Regular",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regular" => Ok(Role::Regular),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered account.
///
/// The account is the sole owner of its identity. Groups reference it by
/// email and id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Lookup identifier.
    pub id: AccountId,
    /// Unique username.
    pub username: String,
    /// Unique email.
    pub email: Email,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Privilege level.
    pub role: Role,
    /// The outstanding long-lived session token, if logged in.
    pub refresh_token: Option<String>,
}

impl Account {
    /// Create a logged-out account.
    pub fn new(username: impl Into<String>, email: Email, password_hash: String, role: Role) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            email,
            password_hash,
            role,
            refresh_token: None,
        }
    }

    /// Whether the account holds the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// CLUSTER B: MEMBERSHIP
// =============================================================================

/// A weak reference from a group to an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupMember {
    /// Email of the member account.
    pub email: Email,
    /// Lookup-only identifier of the member account.
    pub account_id: AccountId,
}

impl GroupMember {
    /// Create a member reference.
    pub fn new(email: Email, account_id: AccountId) -> Self {
        Self { email, account_id }
    }
}

/// A named, ordered set of members.
///
/// `version` increases on every membership write so that conditional
/// updates can detect a concurrent change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group name.
    pub name: String,
    /// Members in join order.
    pub members: Vec<GroupMember>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Group {
    /// Create a group at version zero.
    pub fn new(name: impl Into<String>, members: Vec<GroupMember>) -> Self {
        Self {
            name: name.into(),
            members,
            version: 0,
        }
    }

    /// Whether the email is a member of this group.
    pub fn contains(&self, email: &Email) -> bool {
        self.members.iter().any(|m| &m.email == email)
    }

    /// Member emails in join order.
    pub fn member_emails(&self) -> Vec<Email> {
        self.members.iter().map(|m| m.email.clone()).collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// =============================================================================
// CLUSTER C: LEDGER
// =============================================================================

/// A record category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique type label, referenced by records.
    pub category_type: String,
    /// Display color.
    pub color: String,
    /// Creation order assigned by the store. Lower is older.
    pub created_seq: u64,
}

/// Identifier of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A time-stamped amount owned by an account and filed under a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier.
    pub id: RecordId,
    /// Username of the owning account.
    pub username: String,
    /// Category type label. Always resolves to an existing category.
    pub category_type: String,
    /// Amount.
    pub amount: f64,
    /// Timestamp.
    pub date: DateTime<Utc>,
}

impl Record {
    /// Create a record with a fresh id.
    pub fn new(
        username: impl Into<String>,
        category_type: impl Into<String>,
        amount: f64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            username: username.into(),
            category_type: category_type.into(),
            amount,
            date,
        }
    }
}
