//! Session configuration.
//!
//! The signing secret is injected here and handed to the verifier at
//! construction; nothing reads it from process state afterwards.

use super::errors::ConfigError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default short-lived token lifetime (1 hour).
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(60 * 60);

/// Default long-lived token lifetime (7 days).
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default cookie path for both session cookies.
pub const DEFAULT_COOKIE_PATH: &str = "/api";

/// Configuration for token signing and session cookies.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC key for signing and verifying tokens.
    pub signing_secret: Vec<u8>,
    /// Short-lived token lifetime.
    pub access_ttl: Duration,
    /// Long-lived token lifetime.
    pub refresh_ttl: Duration,
    /// Path scope of the session cookies.
    pub cookie_path: String,
    /// Whether session cookies require HTTPS.
    pub secure_cookies: bool,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("cookie_path", &self.cookie_path)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

impl SessionConfig {
    /// Create a configuration with default lifetimes.
    pub fn new(signing_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            secure_cookies: true,
        }
    }

    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self::new(b"tally-test-secret".to_vec())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TL_SESSION_SECRET`: HMAC signing key (required, non-empty)
    /// - `TL_ACCESS_TTL_SECS`: short-lived lifetime (default: 3600)
    /// - `TL_REFRESH_TTL_SECS`: long-lived lifetime (default: 604800)
    /// - `TL_COOKIE_PATH`: cookie path (default: /api)
    /// - `TL_SECURE_COOKIES`: require HTTPS for cookies (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("TL_SESSION_SECRET").unwrap_or_default();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let mut config = Self::new(secret.into_bytes());
        if let Some(secs) = read_secs("TL_ACCESS_TTL_SECS")? {
            config.access_ttl = secs;
        }
        if let Some(secs) = read_secs("TL_REFRESH_TTL_SECS")? {
            config.refresh_ttl = secs;
        }
        if let Ok(path) = env::var("TL_COOKIE_PATH") {
            config.cookie_path = path;
        }
        config.secure_cookies = env::var("TL_SECURE_COOKIES")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.access_ttl.is_zero() || self.refresh_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "ttl",
                value: "0".to_string(),
            });
        }
        if self.refresh_ttl < self.access_ttl {
            return Err(ConfigError::InvalidValue {
                var: "TL_REFRESH_TTL_SECS",
                value: self.refresh_ttl.as_secs().to_string(),
            });
        }
        Ok(())
    }
}

fn read_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(None),
    }
}
