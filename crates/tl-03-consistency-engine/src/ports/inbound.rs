//! # Inbound Port - ConsistencyApi
//!
//! Mutations that keep cross-entity invariants intact.
//!
//! | Method | Invariant preserved |
//! |--------|---------------------|
//! | `remove_categories` | every record resolves to a category; one category always remains |
//! | `remove_account` | no record or membership outlives its account; no empty group |
//! | `create_group` / `add_members` | an email is in at most one group |
//! | `remove_members` | a group keeps at least one member |
//! | `create_record` | a record's owner and category exist |
//! | `remove_records` | a batch with an unknown id deletes nothing |
//!
//! Callers are expected to have checked the caller's capability first.

use crate::domain::{
    AccountRemovalReport, CategoryRemovalReport, CategoryUpdateReport, EngineError,
    MembershipAddReport, MembershipRemovalReport,
};
use async_trait::async_trait;
use shared_types::{Category, Email, Group, Record};
use tl_01_record_store::RecordFilter;

/// Primary API for the Consistency Engine.
#[async_trait]
pub trait ConsistencyApi: Send + Sync {
    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    async fn create_category(&self, category_type: &str, color: &str) -> Result<Category, EngineError>;

    /// Rename a category and move its records to the new label.
    async fn update_category(
        &self,
        old_type: &str,
        new_type: &str,
        color: &str,
    ) -> Result<CategoryUpdateReport, EngineError>;

    /// Delete categories, merging their records into a fallback category.
    ///
    /// If every existing category is targeted, the oldest one is kept as the
    /// fallback. Unknown labels are reported, not fatal.
    async fn remove_categories(&self, labels: &[String]) -> Result<CategoryRemovalReport, EngineError>;

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Delete a non-admin account together with its records and membership.
    async fn remove_account(&self, email: &str) -> Result<AccountRemovalReport, EngineError>;

    // =========================================================================
    // Groups
    // =========================================================================

    /// Look up a group.
    async fn find_group(&self, name: &str) -> Result<Group, EngineError>;

    /// Create a group with `creator` and every eligible candidate.
    async fn create_group(
        &self,
        name: &str,
        creator: &Email,
        candidates: &[String],
    ) -> Result<MembershipAddReport, EngineError>;

    /// Add eligible candidates to an existing group.
    async fn add_members(&self, name: &str, candidates: &[String]) -> Result<MembershipAddReport, EngineError>;

    /// Remove eligible candidates from an existing group.
    async fn remove_members(
        &self,
        name: &str,
        candidates: &[String],
    ) -> Result<MembershipRemovalReport, EngineError>;

    /// Delete a group.
    async fn delete_group(&self, name: &str) -> Result<(), EngineError>;

    // =========================================================================
    // Records
    // =========================================================================

    /// File a new record for `username` under `category_type`.
    async fn create_record(
        &self,
        username: &str,
        category_type: &str,
        amount: f64,
    ) -> Result<Record, EngineError>;

    /// Records matching `filter`, oldest first.
    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, EngineError>;

    /// Delete one record owned by `username`.
    async fn remove_record(&self, username: &str, id: &str) -> Result<(), EngineError>;

    /// Delete every listed record, or none if any id is unknown.
    async fn remove_records(&self, ids: &[String]) -> Result<u64, EngineError>;
}
