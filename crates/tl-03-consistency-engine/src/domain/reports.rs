//! Result payloads of engine operations.
//!
//! Reports serialize in camelCase so the gateway can hand them to the
//! transport layer unchanged.

use serde::{Deserialize, Serialize};
use shared_types::{Email, Group};

/// Outcome of a category removal batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRemovalReport {
    /// Categories actually deleted, in request order.
    pub removed: Vec<String>,
    /// The category that absorbed their records.
    pub fallback: String,
    /// Records moved to the fallback.
    pub reassigned_records: u64,
    /// Requested labels that did not exist.
    pub not_found: Vec<String>,
    /// Labels left in place because their deletion kept failing.
    pub failed: Vec<String>,
}

/// Outcome of a category rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdateReport {
    /// The new type label.
    pub category_type: String,
    /// The new color.
    pub color: String,
    /// Records moved to the new label.
    pub reassigned_records: u64,
}

/// How an account removal touched the account's group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "group")]
pub enum GroupEdit {
    /// The account was in no group.
    None,
    /// The account was removed from the named group.
    MemberRemoved(String),
    /// The account was the last member, so the named group was deleted.
    GroupDeleted(String),
}

impl GroupEdit {
    /// Whether any group was touched.
    pub fn occurred(&self) -> bool {
        !matches!(self, GroupEdit::None)
    }
}

/// Outcome of an account removal cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRemovalReport {
    /// Records owned by the account that were deleted.
    pub deleted_records: u64,
    /// Whether a group was edited or deleted.
    pub deleted_from_group: bool,
    /// The group edit performed.
    pub group_edit: GroupEdit,
}

/// Outcome of group creation or member addition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipAddReport {
    /// The group after the write.
    pub group: Group,
    /// Candidates that already belong to a group.
    pub already_in_group: Vec<Email>,
    /// Candidates with no account.
    pub members_not_found: Vec<Email>,
}

/// Outcome of member removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRemovalReport {
    /// The group after the write.
    pub group: Group,
    /// Candidates that are not members of this group.
    pub not_in_group: Vec<Email>,
    /// Candidates with no account.
    pub members_not_found: Vec<Email>,
    /// Eligible member kept so the group does not become empty.
    pub retained: Option<Email>,
}
