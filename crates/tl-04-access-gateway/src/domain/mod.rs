//! # Domain Module
//!
//! Gateway errors, request bodies, responses and cookie directives.

pub mod cookie;
pub mod errors;
pub mod requests;
pub mod response;

pub use cookie::*;
pub use errors::*;
pub use requests::*;
pub use response::*;
