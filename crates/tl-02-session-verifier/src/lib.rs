//! # Session Verifier Subsystem (TL-02)
//!
//! Decides whether a caller holding a short-lived / long-lived token pair may
//! perform an operation, and transparently rotates an expired short-lived
//! token while the long-lived one is still valid.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): claims, requirements, token codec, config
//! - **Ports Layer** (`ports/`): the `SessionVerificationApi` inbound port
//! - **Service Layer** (`service.rs`): the single verification pipeline
//!
//! ## Requirements
//!
//! | Requirement | Predicate | Deny reason |
//! |-------------|-----------|-------------|
//! | `Authenticated` | always | - |
//! | `Owner(username)` | `claims.username == username` | `UsernameMismatch` |
//! | `Admin` | `claims.role == Admin` | `NotAdmin` |
//! | `GroupMember(emails)` | `claims.email ∈ emails` | `NotInGroup` |
//!
//! ## Security Notes
//!
//! - **Injected secret**: the signing key arrives in `SessionConfig` at
//!   construction; the verifier never reads process state.
//! - **No store access**: verification is a pure function of the two tokens,
//!   the requirement and the clock.
//! - **Terminal long-token expiry**: an expired long-lived token always yields
//!   `ReauthenticationRequired`; no rotation is attempted.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::claims::{Identity, TokenClaims};
pub use domain::config::{SessionConfig, DEFAULT_ACCESS_TTL, DEFAULT_COOKIE_PATH, DEFAULT_REFRESH_TTL};
pub use domain::errors::{ConfigError, TokenError};
pub use domain::outcome::{TokenPair, VerificationOutcome, ROTATION_ADVISORY};
pub use domain::requirement::{DenyReason, Requirement};
pub use domain::token::TokenCodec;
pub use ports::inbound::SessionVerificationApi;
pub use service::SessionVerifier;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
