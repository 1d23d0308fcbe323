//! # Ports
//!
//! API trait exposed to the access gateway.

pub mod inbound;

pub use inbound::SessionVerificationApi;
