//! In-Memory Record Store Adapter
//!
//! Implements the `RecordStore` port over a single lock-protected state.
//! Every port method takes the lock once, so each call is atomic and
//! conditional writes cannot interleave with the reads they depend on.

use crate::domain::{MembershipChange, RecordFilter, StoreError};
use crate::ports::RecordStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Account, Category, Email, Group, Record, RecordId};
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
struct StoreState {
    /// Accounts keyed by username.
    accounts: HashMap<String, Account>,
    /// Groups keyed by name.
    groups: HashMap<String, Group>,
    /// Categories in creation order.
    categories: Vec<Category>,
    next_category_seq: u64,
    /// Records in insertion order.
    records: Vec<Record>,
}

impl StoreState {
    fn group_of(&self, email: &Email) -> Option<&Group> {
        self.groups.values().find(|g| g.contains(email))
    }

    fn category_exists(&self, category_type: &str) -> bool {
        self.categories.iter().any(|c| c.category_type == category_type)
    }

    fn reassign_records(&mut self, from: &str, to: &str) -> u64 {
        let mut moved = 0;
        for record in self.records.iter_mut().filter(|r| r.category_type == from) {
            record.category_type = to.to_string();
            moved += 1;
        }
        moved
    }
}

/// In-memory record store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: RwLock<StoreState>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.state.read().records.len()
    }

    /// Number of stored groups.
    pub fn group_count(&self) -> usize {
        self.state.read().groups.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.state.read().accounts.get(username).cloned())
    }

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(self
            .state
            .read()
            .accounts
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn find_account_by_refresh_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .state
            .read()
            .accounts
            .values()
            .find(|a| a.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create_account(&self, account: Account) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.accounts.contains_key(&account.username) {
            return Err(StoreError::Duplicate(format!("username {}", account.username)));
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate(format!("email {}", account.email)));
        }
        debug!("[tl-01] Creating account {}", account.username);
        state.accounts.insert(account.username.clone(), account);
        Ok(())
    }

    async fn update_refresh_token(&self, username: &str, token: Option<String>) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let account = state
            .accounts
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("account {username}")))?;
        account.refresh_token = token;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.state.read().accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    async fn delete_account(&self, email: &Email) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        if let Some(group) = state.group_of(email) {
            return Err(StoreError::InvariantViolation(format!(
                "{email} still belongs to group {}",
                group.name
            )));
        }
        let username = state
            .accounts
            .values()
            .find(|a| &a.email == email)
            .map(|a| a.username.clone());
        match username {
            Some(username) => {
                debug!("[tl-01] Deleting account {}", username);
                state.accounts.remove(&username);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        Ok(self.state.read().groups.get(name).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let mut groups: Vec<Group> = self.state.read().groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_group_containing_email(&self, email: &Email) -> Result<Option<Group>, StoreError> {
        Ok(self.state.read().group_of(email).cloned())
    }

    async fn create_group(&self, group: Group) -> Result<Group, StoreError> {
        let mut state = self.state.write();
        if state.groups.contains_key(&group.name) {
            return Err(StoreError::Duplicate(format!("group {}", group.name)));
        }
        if group.is_empty() {
            return Err(StoreError::InvariantViolation(format!(
                "group {} has no members",
                group.name
            )));
        }
        if let Some(member) = group.members.iter().find(|m| state.group_of(&m.email).is_some()) {
            return Err(StoreError::InvariantViolation(format!(
                "{} already belongs to a group",
                member.email
            )));
        }

        let group = Group { version: 0, ..group };
        debug!(
            "[tl-01] Creating group {} with {} members",
            group.name,
            group.len()
        );
        state.groups.insert(group.name.clone(), group.clone());
        Ok(group)
    }

    async fn update_group_members(
        &self,
        name: &str,
        expected_version: u64,
        change: MembershipChange,
    ) -> Result<Group, StoreError> {
        let mut state = self.state.write();
        let current = state
            .groups
            .get(name)
            .ok_or_else(|| StoreError::NotFound(format!("group {name}")))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                aggregate: format!("group:{name}"),
                expected: expected_version,
                found: current.version,
            });
        }

        let mut updated = current.clone();
        match change {
            MembershipChange::Push(members) => {
                for member in members {
                    if state.group_of(&member.email).is_some() || updated.contains(&member.email) {
                        return Err(StoreError::InvariantViolation(format!(
                            "{} already belongs to a group",
                            member.email
                        )));
                    }
                    updated.members.push(member);
                }
            }
            MembershipChange::Pull(emails) => {
                updated.members.retain(|m| !emails.contains(&m.email));
                if updated.is_empty() {
                    return Err(StoreError::InvariantViolation(format!(
                        "group {name} would have no members"
                    )));
                }
            }
        }
        updated.version += 1;

        debug!(
            "[tl-01] Group {} now at version {} with {} members",
            name,
            updated.version,
            updated.len()
        );
        state.groups.insert(name.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_group(&self, name: &str, expected_version: Option<u64>) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let current = state
            .groups
            .get(name)
            .ok_or_else(|| StoreError::NotFound(format!("group {name}")))?;

        if let Some(expected) = expected_version {
            if current.version != expected {
                return Err(StoreError::VersionConflict {
                    aggregate: format!("group:{name}"),
                    expected,
                    found: current.version,
                });
            }
        }

        debug!("[tl-01] Deleting group {}", name);
        state.groups.remove(name);
        Ok(())
    }

    async fn find_category_by_type(&self, category_type: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .state
            .read()
            .categories
            .iter()
            .find(|c| c.category_type == category_type)
            .cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.read().categories.clone())
    }

    async fn count_categories(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().categories.len())
    }

    async fn earliest_category(&self, excluding: &[String]) -> Result<Option<Category>, StoreError> {
        Ok(self
            .state
            .read()
            .categories
            .iter()
            .filter(|c| !excluding.contains(&c.category_type))
            .min_by_key(|c| c.created_seq)
            .cloned())
    }

    async fn create_category(&self, category_type: &str, color: &str) -> Result<Category, StoreError> {
        let mut state = self.state.write();
        if state.category_exists(category_type) {
            return Err(StoreError::Duplicate(format!("category {category_type}")));
        }
        let category = Category {
            category_type: category_type.to_string(),
            color: color.to_string(),
            created_seq: state.next_category_seq,
        };
        state.next_category_seq += 1;
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category_reassigning(
        &self,
        category_type: &str,
        fallback_type: &str,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        if category_type == fallback_type {
            return Err(StoreError::InvariantViolation(format!(
                "category {category_type} cannot absorb its own records"
            )));
        }
        if !state.category_exists(category_type) {
            return Err(StoreError::NotFound(format!("category {category_type}")));
        }
        if !state.category_exists(fallback_type) {
            return Err(StoreError::InvariantViolation(format!(
                "fallback category {fallback_type} does not exist"
            )));
        }

        state.categories.retain(|c| c.category_type != category_type);
        let moved = state.reassign_records(category_type, fallback_type);
        debug!(
            "[tl-01] Deleted category {}, {} records moved to {}",
            category_type, moved, fallback_type
        );
        Ok(moved)
    }

    async fn rename_category(
        &self,
        old_type: &str,
        new_type: &str,
        color: &str,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        if old_type != new_type && state.category_exists(new_type) {
            return Err(StoreError::Duplicate(format!("category {new_type}")));
        }
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.category_type == old_type)
            .ok_or_else(|| StoreError::NotFound(format!("category {old_type}")))?;
        category.category_type = new_type.to_string();
        category.color = color.to_string();

        Ok(state.reassign_records(old_type, new_type))
    }

    async fn insert_record(&self, record: Record) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.accounts.contains_key(&record.username) {
            return Err(StoreError::InvariantViolation(format!(
                "account {} does not exist",
                record.username
            )));
        }
        if !state.category_exists(&record.category_type) {
            return Err(StoreError::InvariantViolation(format!(
                "category {} does not exist",
                record.category_type
            )));
        }
        state.records.push(record);
        Ok(())
    }

    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, StoreError> {
        let mut found: Vec<Record> = self
            .state
            .read()
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    async fn delete_records(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        let before = state.records.len();
        state.records.retain(|r| !filter.matches(r));
        Ok((before - state.records.len()) as u64)
    }

    async fn delete_records_by_id(&self, ids: &[RecordId]) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        if let Some(missing) = ids.iter().find(|id| !state.records.iter().any(|r| &r.id == *id)) {
            return Err(StoreError::NotFound(format!("record {missing}")));
        }
        let before = state.records.len();
        state.records.retain(|r| !ids.contains(&r.id));
        let removed = (before - state.records.len()) as u64;
        debug!("[tl-01] Deleted {} records by id", removed);
        Ok(removed)
    }
}
