//! # Ports
//!
//! The storage interface the core drives.

pub mod outbound;

pub use outbound::RecordStore;
