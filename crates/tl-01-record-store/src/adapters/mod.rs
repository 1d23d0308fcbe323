//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `RecordStore` port.

mod memory;

pub use memory::InMemoryRecordStore;
