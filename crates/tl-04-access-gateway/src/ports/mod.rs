//! # Ports
//!
//! Outbound dependencies of the gateway beyond the record store.

pub mod outbound;

pub use outbound::{CredentialHasher, HashError};
