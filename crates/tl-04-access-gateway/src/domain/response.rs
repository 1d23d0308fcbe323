//! The structured result every gateway operation returns.

use super::cookie::CookieDirective;
use super::errors::GatewayError;
use serde::Serialize;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared_types::{Account, Email, Record, RecordId, Role, StatusClass};

/// Result of one gateway operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// Outcome class.
    pub status: StatusClass,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the verifier rotated the short-lived token.
    #[serde(skip)]
    pub renewed_access_cookie: Option<CookieDirective>,
    /// Session cookies set or cleared by login and logout.
    #[serde(skip)]
    pub session_cookies: Vec<CookieDirective>,
    /// Advisory shown once after a rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_token_message: Option<String>,
}

impl GatewayResponse {
    /// Successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            status: StatusClass::Ok,
            data: Some(data),
            error: None,
            renewed_access_cookie: None,
            session_cookies: Vec::new(),
            refreshed_token_message: None,
        }
    }

    /// Successful response carrying `{"message": ...}`.
    pub fn message(message: &str) -> Self {
        Self::ok(serde_json::json!({ "message": message }))
    }

    /// Failed response.
    pub fn failure(err: &GatewayError) -> Self {
        Self {
            status: err.status(),
            data: None,
            error: Some(err.to_string()),
            renewed_access_cookie: None,
            session_cookies: Vec::new(),
            refreshed_token_message: None,
        }
    }

    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

/// A record as returned to its owner, with its category color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    /// Record id, the handle for `delete_record`.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Owning username.
    pub username: String,
    /// Amount.
    pub amount: f64,
    /// Category type label.
    #[serde(rename = "type")]
    pub category_type: String,
    /// Creation time.
    pub date: DateTime<Utc>,
    /// Color of the category, empty if the category is gone.
    pub color: String,
}

impl RecordView {
    /// Attach `color` to `record`.
    pub fn new(record: Record, color: String) -> Self {
        Self {
            id: record.id,
            username: record.username,
            amount: record.amount,
            category_type: record.category_type,
            date: record.date,
            color,
        }
    }
}

/// An account as listed to administrators. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: Email,
    /// Privilege level.
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}
