//! # Tally Test Suite
//!
//! Cross-subsystem flows driven through the access gateway over the
//! in-memory record store.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Harness: gateway, store and manual clock
//! └── integration/
//!     ├── session_flows.rs     # login, rotation, reauthentication
//!     ├── category_flows.rs    # merge-delete and rename
//!     ├── account_flows.rs     # cascade and record access
//!     └── group_flows.rs       # membership partition and concurrency
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tl-tests
//! cargo test -p tl-tests integration::group_flows::
//! ```

#[cfg(test)]
mod fixtures;

pub mod integration;
