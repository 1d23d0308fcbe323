//! # TL-04 Access Gateway
//!
//! The operation surface of Tally. Every operation verifies the caller's
//! session cookies against its requirement, then delegates to the
//! Consistency Engine and wraps the result in a [`GatewayResponse`].
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Status Classes
//!
//! | Failure | Status |
//! |---------|--------|
//! | Authentication failure or capability denied | `Unauthorized` |
//! | Validation, not found, conflict | `ClientError` |
//! | Store or internal failure | `ServerError` |
//!
//! When the verifier rotated the short-lived token, the response carries
//! `renewed_access_cookie` and, on success, the rotation advisory.
//!
//! ## Module Structure
//!
//! ```text
//! tl-04-access-gateway/
//! ├── domain/
//! │   ├── cookie.rs      # SessionCookies, CookieDirective
//! │   ├── errors.rs      # GatewayError
//! │   ├── requests.rs    # request bodies
//! │   └── response.rs    # GatewayResponse, RecordView, AccountView
//! ├── ports/
//! │   └── outbound.rs    # CredentialHasher
//! ├── adapters/
//! │   └── password.rs    # Argon2Hasher
//! └── service.rs         # AccessGateway
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::Argon2Hasher;
pub use domain::{
    AccountView, CategoryRequest, CookieDirective, DeleteRecordRequest, DeleteRecordsRequest,
    GatewayError, GatewayResponse, GroupRequest, LoginRequest, MembersRequest, RecordRequest,
    RecordView, RegisterRequest, SameSite, SessionCookies, ACCESS_COOKIE, REFRESH_COOKIE,
};
pub use ports::{CredentialHasher, HashError};
pub use service::AccessGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
