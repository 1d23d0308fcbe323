//! Session cookies: what the transport layer hands in and what it must set.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tl_02_session_verifier::SessionConfig;

/// Cookie name of the short-lived token.
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie name of the long-lived token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// The two opaque session tokens of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookies {
    /// Short-lived token.
    pub access_token: Option<String>,
    /// Long-lived token.
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    /// Both tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// No tokens.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Same-site requests only.
    Strict,
    /// Top-level navigations too.
    Lax,
    /// Cross-site allowed (requires `secure`).
    None,
}

/// Instruction to the transport layer to set a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDirective {
    /// Cookie name.
    pub name: String,
    /// Cookie value. Empty when clearing.
    pub value: String,
    /// Path scope.
    pub path: String,
    /// Hidden from scripts.
    pub http_only: bool,
    /// HTTPS only.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// Lifetime. Zero clears the cookie.
    pub max_age: Duration,
}

impl CookieDirective {
    fn scoped(name: &str, value: String, max_age: Duration, config: &SessionConfig) -> Self {
        Self {
            name: name.to_string(),
            value,
            path: config.cookie_path.clone(),
            http_only: true,
            secure: config.secure_cookies,
            same_site: SameSite::None,
            max_age,
        }
    }

    /// Set the short-lived token.
    pub fn access(token: impl Into<String>, config: &SessionConfig) -> Self {
        Self::scoped(ACCESS_COOKIE, token.into(), config.access_ttl, config)
    }

    /// Set the long-lived token.
    pub fn refresh(token: impl Into<String>, config: &SessionConfig) -> Self {
        Self::scoped(REFRESH_COOKIE, token.into(), config.refresh_ttl, config)
    }

    /// Clear the named cookie.
    pub fn clear(name: &str, config: &SessionConfig) -> Self {
        Self::scoped(name, String::new(), Duration::ZERO, config)
    }
}
