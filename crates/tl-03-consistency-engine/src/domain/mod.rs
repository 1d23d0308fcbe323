//! # Domain Module
//!
//! Errors, configuration, reports and the pure membership partition.

pub mod config;
pub mod errors;
pub mod partition;
pub mod reports;

pub use config::*;
pub use errors::*;
pub use partition::*;
pub use reports::*;
