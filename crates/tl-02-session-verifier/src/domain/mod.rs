//! # Domain Module
//!
//! Core types for the Session Verifier: claims, requirements, outcomes,
//! configuration and the token codec.

pub mod claims;
pub mod config;
pub mod errors;
pub mod outcome;
pub mod requirement;
pub mod token;

pub use claims::*;
pub use config::*;
pub use errors::*;
pub use outcome::*;
pub use requirement::*;
pub use token::*;
