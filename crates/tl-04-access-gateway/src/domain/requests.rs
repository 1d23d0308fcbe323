//! Parsed request bodies.
//!
//! Field names follow the JSON bodies the transport layer receives.

use serde::{Deserialize, Serialize};

/// Body of `register` and `register_admin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Clear-text password.
    pub password: String,
}

/// Body of `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Clear-text password.
    pub password: String,
}

/// Body of `create_category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRequest {
    /// Type label.
    #[serde(rename = "type")]
    pub category_type: String,
    /// Display color.
    pub color: String,
}

/// Body of `create_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    /// Group name.
    pub name: String,
    /// Candidate member emails.
    pub member_emails: Vec<String>,
}

/// Body of the membership edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersRequest {
    /// Candidate member emails.
    pub emails: Vec<String>,
}

/// Body of `create_record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Owning username; must match the path username.
    pub username: String,
    /// Amount.
    pub amount: f64,
    /// Category type label.
    #[serde(rename = "type")]
    pub category_type: String,
}

/// Body of `delete_record`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecordRequest {
    /// Record id.
    #[serde(rename = "_id")]
    pub id: String,
}

/// Body of `delete_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRecordsRequest {
    /// Record ids.
    #[serde(rename = "_ids")]
    pub ids: Vec<String>,
}
