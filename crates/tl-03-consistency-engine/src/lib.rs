//! # TL-03 Consistency Engine
//!
//! Keeps the entities of the shared record store consistent with each other.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Operations
//!
//! - **Category removal with merge**: records of deleted categories move to
//!   the oldest surviving category. Targeting every category keeps the
//!   oldest one.
//! - **Account removal with cascade**: the account's records are deleted and
//!   it leaves its group; a group left empty is deleted.
//! - **Record deletion**: one record of its owner, or a batch that deletes
//!   every listed record or none.
//! - **Group membership partition**: candidates for creation, addition or
//!   removal are split into eligible / excluded / not-found.
//!
//! ## Concurrency
//!
//! Group writes are conditional on the version read during partitioning.
//! A conflicting write fails with `ConflictKind::ConcurrentModification`.
//! The two cascades retry instead, bounded by
//! `EngineConfig::max_conflict_retries`: account removal re-detaches a
//! re-added membership, and category removal re-resolves a fallback that
//! vanished mid-batch.
//!
//! ## Module Structure
//!
//! ```text
//! tl-03-consistency-engine/
//! ├── domain/
//! │   ├── config.rs      # EngineConfig
//! │   ├── errors.rs      # EngineError, ConflictKind
//! │   ├── partition.rs   # parse_candidates, partition
//! │   └── reports.rs     # operation results
//! ├── ports/
//! │   └── inbound.rs     # ConsistencyApi
//! └── service.rs         # ConsistencyEngine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    AccountRemovalReport, CategoryRemovalReport, CategoryUpdateReport, ConflictKind, EngineConfig,
    EngineError, GroupEdit, MembershipAddReport, MembershipRemovalReport,
};
pub use ports::ConsistencyApi;
pub use service::ConsistencyEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
