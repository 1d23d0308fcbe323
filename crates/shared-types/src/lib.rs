//! # Shared Types Crate
//!
//! This crate contains the entities every Tally subsystem agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Account`, `Group`, `Category` and `Record`
//!   are defined once and reused by the store, the engine and the gateway.
//! - **Weak Membership**: a `GroupMember` holds an email value and a
//!   lookup-only `AccountId`. A group never owns the account it names.
//! - **Validated Values**: an `Email` can only be built through
//!   [`Email::parse`], so downstream code never re-checks syntax.

pub mod email;
pub mod entities;
pub mod errors;
pub mod time;

pub use email::Email;
pub use entities::*;
pub use errors::*;
pub use time::*;
