//! # Time Source
//!
//! Abstract clock so that token expiry and record timestamps are testable.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstract interface for time operations.
pub trait TimeSource: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> u64;

    /// Current instant as a UTC date-time.
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.now() as i64, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    /// Returns 0 if the system clock is before `UNIX_EPOCH`.
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<u64>>,
}

impl ManualClock {
    /// Start the clock at the given Unix timestamp.
    pub fn starting_at(now: u64) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        *self.now.lock() += secs;
    }

    /// Jump to an absolute timestamp.
    pub fn set(&self, now: u64) {
        *self.now.lock() = now;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u64 {
        *self.now.lock()
    }
}
