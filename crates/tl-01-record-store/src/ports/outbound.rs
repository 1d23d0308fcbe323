//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the consistency engine and the access gateway.
//!
//! Production: a database-backed adapter supplied by the host application.
//! Testing: `InMemoryRecordStore` (see `adapters`).
//!
//! Every method is one store access. Methods that touch more than one
//! entity (`update_group_members`, `delete_category_reassigning`,
//! `rename_category`, `insert_record`, `delete_records_by_id`) are atomic per
//! aggregate: they either apply completely or fail without effect.
//!
//! ## Account deletion
//!
//! `delete_account` refuses an account that is still a group member and
//! `insert_record` refuses a record whose owner is gone, so a cascade that
//! detaches the membership, deletes the account and then its records leaves
//! nothing behind even when other writers race it. The one window left is a
//! push of an email whose account is deleted after the caller looked it up:
//! `update_group_members` does not re-check that pushed members still have
//! an account.

use crate::domain::{MembershipChange, RecordFilter, StoreError};
use async_trait::async_trait;
use shared_types::{Account, Category, Email, Group, Record, RecordId};

/// Abstract interface for the shared record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    /// Find an account by username.
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Find an account by email.
    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Find the account holding this long-lived token.
    async fn find_account_by_refresh_token(&self, token: &str) -> Result<Option<Account>, StoreError>;

    /// Insert an account. Fails with `Duplicate` on a taken username or email.
    async fn create_account(&self, account: Account) -> Result<(), StoreError>;

    /// Set or clear the persisted long-lived token.
    async fn update_refresh_token(&self, username: &str, token: Option<String>) -> Result<(), StoreError>;

    /// Every account, ordered by username.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Delete an account. Returns whether it existed.
    ///
    /// Fails with `InvariantViolation` while the email is still a group member.
    async fn delete_account(&self, email: &Email) -> Result<bool, StoreError>;

    // -------------------------------------------------------------------------
    // Groups
    // -------------------------------------------------------------------------

    /// Find a group by name.
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;

    /// Every group, ordered by name.
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    /// Find the group that has `email` as a member, if any.
    async fn find_group_containing_email(&self, email: &Email) -> Result<Option<Group>, StoreError>;

    /// Insert a group.
    ///
    /// Fails with `Duplicate` if the name is taken and with
    /// `InvariantViolation` if it has no members or any member already
    /// belongs to a group.
    async fn create_group(&self, group: Group) -> Result<Group, StoreError>;

    /// Apply a membership change if the stored version equals `expected_version`.
    ///
    /// Pushed members must not belong to any group; a pull must leave at
    /// least one member. Returns the updated group with its version bumped.
    async fn update_group_members(
        &self,
        name: &str,
        expected_version: u64,
        change: MembershipChange,
    ) -> Result<Group, StoreError>;

    /// Delete a group, optionally only if it is still at `expected_version`.
    async fn delete_group(&self, name: &str, expected_version: Option<u64>) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Find a category by type label.
    async fn find_category_by_type(&self, category_type: &str) -> Result<Option<Category>, StoreError>;

    /// All categories in creation order.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Number of categories.
    async fn count_categories(&self) -> Result<usize, StoreError>;

    /// The oldest category whose type is not in `excluding`.
    async fn earliest_category(&self, excluding: &[String]) -> Result<Option<Category>, StoreError>;

    /// Insert a category, assigning the next creation sequence number.
    async fn create_category(&self, category_type: &str, color: &str) -> Result<Category, StoreError>;

    /// Delete `category_type` and move its records to `fallback_type`.
    ///
    /// Fails with `NotFound` if `category_type` is absent and with
    /// `InvariantViolation` if the fallback is absent or the same label.
    /// Returns the number of reassigned records.
    async fn delete_category_reassigning(
        &self,
        category_type: &str,
        fallback_type: &str,
    ) -> Result<u64, StoreError>;

    /// Rename a category, update its color and move its records to the new label.
    ///
    /// Returns the number of reassigned records.
    async fn rename_category(
        &self,
        old_type: &str,
        new_type: &str,
        color: &str,
    ) -> Result<u64, StoreError>;

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Insert a record.
    ///
    /// Fails with `InvariantViolation` if its owner or its category is absent.
    async fn insert_record(&self, record: Record) -> Result<(), StoreError>;

    /// Records matching the filter, oldest first.
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError>;

    /// Delete matching records. Returns how many were removed.
    async fn delete_records(&self, filter: &RecordFilter) -> Result<u64, StoreError>;

    /// Delete exactly these records.
    ///
    /// Fails with `NotFound` and deletes nothing if any id is absent.
    async fn delete_records_by_id(&self, ids: &[RecordId]) -> Result<u64, StoreError>;
}
