//! # Tally Telemetry
//!
//! Structured logging for every Tally subsystem.
//!
//! Subsystems log through the `tracing` macros with a `[tl-NN]` prefix; this
//! crate installs the subscriber that renders them, pretty for development
//! or JSON for log shippers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // ...
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `TL_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `TL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TL_SERVICE_NAME` | `tally` | Service name |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Failed to initialize logging: {0}")]
    Init(String),

    /// The log filter could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber.
///
/// Returns a guard that should be held for the lifetime of the application.
/// A second call fails with [`TelemetryError::Init`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json = config.json_logs,
        version = VERSION,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Logs the shutdown on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service name the subscriber was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
