//! # TL-01 Record Store
//!
//! Storage port shared by the consistency engine and the access gateway.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Names every store access the core performs, independent of the storage
//! engine behind it:
//! - Account lookups by username, email and long-lived token, and listing
//! - Group lookups, listing and version-checked membership updates
//! - Category lookups and the atomic delete-and-reassign merge
//! - Record inserts, filtered reads, bulk deletes and deletes by id
//!
//! ## Atomicity
//!
//! | Aggregate | Natural key | Guarantee |
//! |-----------|-------------|-----------|
//! | Group | name | membership writes are conditional on `Group::version` |
//! | Category | type | deletion and record reassignment happen in one call |
//! | Account | username | deletion fails while the email is a group member |
//! | Record | id | insert fails if its owner or category does not exist; deletion by id is all-or-nothing |
//!
//! ## Module Structure
//!
//! ```text
//! tl-01-record-store/
//! ├── domain/          # StoreError, RecordFilter, MembershipChange
//! ├── ports/           # RecordStore trait
//! └── adapters/        # InMemoryRecordStore
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryRecordStore;
pub use domain::{FilterError, MembershipChange, RecordFilter, RecordQuery, StoreError};
pub use ports::RecordStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
