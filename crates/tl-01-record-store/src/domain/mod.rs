//! # Domain Module
//!
//! Store-level error and query types.

pub mod errors;
pub mod filter;

pub use errors::*;
pub use filter::*;
