//! Engine configuration.

use std::env;

/// Default number of re-reads after a version conflict.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Configuration for the Consistency Engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How many times a cascade re-reads an aggregate after a concurrent
    /// change before giving up. Covers the account's group and the fallback
    /// of a category removal.
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

impl EngineConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TL_MAX_CONFLICT_RETRIES`: re-reads after a version conflict (default: 3)
    pub fn from_env() -> Self {
        let max_conflict_retries = env::var("TL_MAX_CONFLICT_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONFLICT_RETRIES);
        Self {
            max_conflict_retries,
        }
    }
}
