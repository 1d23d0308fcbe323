//! # Ports
//!
//! API trait exposed to the access gateway. The outbound dependency is the
//! `RecordStore` port from `tl-01-record-store`.

pub mod inbound;

pub use inbound::ConsistencyApi;
