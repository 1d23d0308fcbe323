//! # Consistency Engine Service
//!
//! Implements `ConsistencyApi` over any `RecordStore`.
//!
//! Every aggregate write is a single conditional store call: group writes
//! carry the version read during partitioning, and a category deletion
//! reassigns its records in the same call. A concurrent change is reported
//! as `ConflictKind::ConcurrentModification` instead of being overwritten.

use crate::domain::{
    parse_candidates, partition, AccountRemovalReport, CandidateFacts, CategoryRemovalReport,
    CategoryUpdateReport, ConflictKind, EngineConfig, EngineError, GroupEdit, MembershipAddReport,
    MembershipOp, MembershipRemovalReport, Partition,
};
use crate::ports::inbound::ConsistencyApi;
use async_trait::async_trait;
use shared_types::{Category, Email, Group, Record, RecordId, SystemTimeSource, TimeSource};
use std::collections::HashSet;
use std::sync::Arc;
use tl_01_record_store::{MembershipChange, RecordFilter, RecordStore, StoreError};
use tracing::{debug, info, warn};

/// Consistency Engine over a shared record store.
pub struct ConsistencyEngine<S: RecordStore> {
    store: Arc<S>,
    config: EngineConfig,
    clock: Arc<dyn TimeSource>,
}

impl<S: RecordStore> ConsistencyEngine<S> {
    /// Create an engine on the wall clock.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemTimeSource))
    }

    /// Create an engine with an explicit clock for record timestamps.
    pub fn with_clock(store: Arc<S>, config: EngineConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Look up account and group facts for each candidate.
    async fn gather_facts(&self, candidates: Vec<Email>) -> Result<Vec<CandidateFacts>, EngineError> {
        let mut facts = Vec::with_capacity(candidates.len());
        for email in candidates {
            let account = self.store.find_account_by_email(&email).await?.map(|a| a.id);
            let group = match account {
                Some(_) => self
                    .store
                    .find_group_containing_email(&email)
                    .await?
                    .map(|g| g.name),
                None => None,
            };
            facts.push(CandidateFacts {
                email,
                account,
                group,
            });
        }
        Ok(facts)
    }

    async fn existing_group(&self, name: &str) -> Result<Group, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::validation("The group name is an empty string"));
        }
        self.store
            .find_group_by_name(name)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("Group {name}")))
    }

    /// Remove `email` from whichever group holds it, deleting the group if
    /// it was the last member. Re-reads the group after a concurrent change.
    async fn detach_from_group(&self, email: &Email) -> Result<GroupEdit, EngineError> {
        for attempt in 0..=self.config.max_conflict_retries {
            let Some(group) = self.store.find_group_containing_email(email).await? else {
                return Ok(GroupEdit::None);
            };

            let result = if group.len() <= 1 {
                self.store
                    .delete_group(&group.name, Some(group.version))
                    .await
                    .map(|_| GroupEdit::GroupDeleted(group.name.clone()))
            } else {
                self.store
                    .update_group_members(
                        &group.name,
                        group.version,
                        MembershipChange::Pull(vec![email.clone()]),
                    )
                    .await
                    .map(|_| GroupEdit::MemberRemoved(group.name.clone()))
            };

            match result {
                Ok(edit) => return Ok(edit),
                Err(StoreError::VersionConflict { .. }) | Err(StoreError::NotFound(_)) => {
                    debug!(
                        "[tl-03] Group {} changed during cascade (attempt {}), re-reading",
                        group.name,
                        attempt + 1
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!("[tl-03] Giving up on group edit for {} after retries", email);
        Err(EngineError::Conflict(ConflictKind::ConcurrentModification))
    }

    /// The oldest category outside `targets`. If every category is targeted,
    /// the oldest overall other than `avoiding` is kept back as the fallback.
    async fn resolve_fallback(&self, targets: &[String], avoiding: Option<&str>) -> Result<String, EngineError> {
        if let Some(category) = self.store.earliest_category(targets).await? {
            return Ok(category.category_type);
        }
        let excluding: Vec<String> = avoiding.map(str::to_string).into_iter().collect();
        self.store
            .earliest_category(&excluding)
            .await?
            .map(|c| c.category_type)
            .ok_or(EngineError::Conflict(ConflictKind::LastCategory))
    }

    /// Delete one category into `fallback`, re-resolving the fallback when it
    /// disappears under us. `Ok(None)` means the label does not exist.
    async fn remove_one_category(
        &self,
        label: &str,
        targets: &[String],
        fallback: &mut String,
    ) -> Result<Option<u64>, EngineError> {
        for attempt in 0..=self.config.max_conflict_retries {
            match self.store.delete_category_reassigning(label, fallback).await {
                Ok(moved) => return Ok(Some(moved)),
                Err(StoreError::NotFound(_)) => return Ok(None),
                Err(StoreError::InvariantViolation(detail)) => {
                    debug!(
                        "[tl-03] Fallback {} unusable for {} (attempt {}): {}",
                        fallback,
                        label,
                        attempt + 1,
                        detail
                    );
                    *fallback = self.resolve_fallback(targets, Some(label)).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Conflict(ConflictKind::ConcurrentModification))
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        Err(EngineError::validation(format!("The {what} is an empty string")))
    } else {
        Ok(())
    }
}

fn parse_record_id(raw: &str) -> Result<RecordId, EngineError> {
    require_non_empty(raw, "record id")?;
    raw.parse()
        .map_err(|_| EngineError::validation(format!("{raw} is not a record id")))
}

fn conflicting_write(err: StoreError) -> EngineError {
    match err {
        StoreError::VersionConflict { .. } | StoreError::InvariantViolation(_) => {
            EngineError::Conflict(ConflictKind::ConcurrentModification)
        }
        other => other.into(),
    }
}

#[async_trait]
impl<S: RecordStore + 'static> ConsistencyApi for ConsistencyEngine<S> {
    async fn create_category(&self, category_type: &str, color: &str) -> Result<Category, EngineError> {
        require_non_empty(category_type, "category type")?;
        require_non_empty(color, "category color")?;

        match self.store.create_category(category_type, color).await {
            Ok(category) => {
                info!("[tl-03] Created category {}", category.category_type);
                Ok(category)
            }
            Err(StoreError::Duplicate(_)) => Err(EngineError::Conflict(ConflictKind::DuplicateCategory)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_category(
        &self,
        old_type: &str,
        new_type: &str,
        color: &str,
    ) -> Result<CategoryUpdateReport, EngineError> {
        require_non_empty(old_type, "category type")?;
        require_non_empty(new_type, "new category type")?;
        require_non_empty(color, "category color")?;

        if self.store.find_category_by_type(old_type).await?.is_none() {
            return Err(EngineError::not_found(format!("Category {old_type}")));
        }

        let reassigned = match self.store.rename_category(old_type, new_type, color).await {
            Ok(count) => count,
            Err(StoreError::Duplicate(_)) => {
                return Err(EngineError::Conflict(ConflictKind::DuplicateCategory))
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "[tl-03] Category {} renamed to {}, {} records moved",
            old_type, new_type, reassigned
        );
        Ok(CategoryUpdateReport {
            category_type: new_type.to_string(),
            color: color.to_string(),
            reassigned_records: reassigned,
        })
    }

    async fn remove_categories(&self, labels: &[String]) -> Result<CategoryRemovalReport, EngineError> {
        if labels.is_empty() {
            return Err(EngineError::validation("No categories to delete"));
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(EngineError::validation(
                "At least one of the category types is an empty string",
            ));
        }

        let mut seen = HashSet::new();
        let targets: Vec<String> = labels
            .iter()
            .filter(|l| seen.insert(l.as_str()))
            .cloned()
            .collect();

        if self.store.count_categories().await? <= 1 {
            return Err(EngineError::Conflict(ConflictKind::LastCategory));
        }

        let mut fallback = self.resolve_fallback(&targets, None).await?;
        let mut report = CategoryRemovalReport {
            removed: Vec::new(),
            fallback: fallback.clone(),
            reassigned_records: 0,
            not_found: Vec::new(),
            failed: Vec::new(),
        };
        let mut first_error = None;

        for label in &targets {
            if *label == fallback {
                continue;
            }
            match self.remove_one_category(label, &targets, &mut fallback).await {
                Ok(Some(moved)) => {
                    report.reassigned_records += moved;
                    report.removed.push(label.clone());
                }
                Ok(None) => report.not_found.push(label.clone()),
                Err(e) => {
                    warn!("[tl-03] Category {} left in place: {}", label, e);
                    report.failed.push(label.clone());
                    first_error.get_or_insert(e);
                }
            }
        }
        report.fallback = fallback;

        if let Some(err) = first_error {
            if report.removed.is_empty() {
                return Err(err);
            }
        }

        info!(
            "[tl-03] Removed {} categories into {}, {} records reassigned",
            report.removed.len(),
            report.fallback,
            report.reassigned_records
        );
        Ok(report)
    }

    async fn remove_account(&self, email: &str) -> Result<AccountRemovalReport, EngineError> {
        let email = Email::parse(email).map_err(|e| EngineError::validation(e.to_string()))?;
        let account = self
            .store
            .find_account_by_email(&email)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("User {email}")))?;

        if account.is_admin() {
            return Err(EngineError::Conflict(ConflictKind::AdminDeletion));
        }

        // The store refuses to delete a grouped account, so a membership
        // pushed after the detach sends us round again.
        let mut group_edit = GroupEdit::None;
        let mut deleted = false;
        for attempt in 0..=self.config.max_conflict_retries {
            let edit = self.detach_from_group(&email).await?;
            if edit.occurred() {
                group_edit = edit;
            }
            match self.store.delete_account(&email).await {
                Ok(_) => {
                    deleted = true;
                    break;
                }
                Err(StoreError::InvariantViolation(detail)) => {
                    debug!(
                        "[tl-03] {} regrouped during cascade (attempt {}): {}",
                        email,
                        attempt + 1,
                        detail
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !deleted {
            warn!("[tl-03] Giving up on removing {} after retries", email);
            return Err(EngineError::Conflict(ConflictKind::ConcurrentModification));
        }

        // Records filed before the account went are swept here; later
        // inserts fail on the missing owner.
        let deleted_records = self
            .store
            .delete_records(&RecordFilter::by_username(account.username.clone()))
            .await?;

        info!(
            "[tl-03] Removed account {} ({} records, group edit: {:?})",
            account.username, deleted_records, group_edit
        );
        Ok(AccountRemovalReport {
            deleted_records,
            deleted_from_group: group_edit.occurred(),
            group_edit,
        })
    }

    async fn find_group(&self, name: &str) -> Result<Group, EngineError> {
        self.existing_group(name).await
    }

    async fn create_group(
        &self,
        name: &str,
        creator: &Email,
        candidates: &[String],
    ) -> Result<MembershipAddReport, EngineError> {
        require_non_empty(name, "group name")?;
        if self.store.find_group_by_name(name).await?.is_some() {
            return Err(EngineError::Conflict(ConflictKind::DuplicateGroup));
        }
        if self.store.find_account_by_email(creator).await?.is_none() {
            return Err(EngineError::not_found(format!("User {creator}")));
        }
        if self.store.find_group_containing_email(creator).await?.is_some() {
            return Err(EngineError::Conflict(ConflictKind::AlreadyGrouped));
        }

        let mut emails = parse_candidates(candidates)?;
        if !emails.contains(creator) {
            emails.push(creator.clone());
        }

        let Partition {
            eligible,
            excluded,
            not_found,
        } = partition(self.gather_facts(emails).await?, MembershipOp::Add);

        if !eligible.iter().any(|m| &m.email != creator) {
            return Err(EngineError::Conflict(ConflictKind::NoEligibleMembers));
        }

        let group = match self.store.create_group(Group::new(name, eligible)).await {
            Ok(group) => group,
            Err(StoreError::Duplicate(_)) => {
                return Err(EngineError::Conflict(ConflictKind::DuplicateGroup))
            }
            Err(e) => return Err(conflicting_write(e)),
        };

        info!(
            "[tl-03] Created group {} with {} members ({} already grouped, {} not found)",
            group.name,
            group.len(),
            excluded.len(),
            not_found.len()
        );
        Ok(MembershipAddReport {
            group,
            already_in_group: excluded,
            members_not_found: not_found,
        })
    }

    async fn add_members(&self, name: &str, candidates: &[String]) -> Result<MembershipAddReport, EngineError> {
        let group = self.existing_group(name).await?;
        let emails = parse_candidates(candidates)?;

        let Partition {
            eligible,
            excluded,
            not_found,
        } = partition(self.gather_facts(emails).await?, MembershipOp::Add);

        if eligible.is_empty() {
            return Err(EngineError::Conflict(ConflictKind::NoEligibleMembers));
        }

        let group = self
            .store
            .update_group_members(&group.name, group.version, MembershipChange::Push(eligible))
            .await
            .map_err(conflicting_write)?;

        debug!("[tl-03] Group {} now has {} members", group.name, group.len());
        Ok(MembershipAddReport {
            group,
            already_in_group: excluded,
            members_not_found: not_found,
        })
    }

    async fn remove_members(
        &self,
        name: &str,
        candidates: &[String],
    ) -> Result<MembershipRemovalReport, EngineError> {
        let group = self.existing_group(name).await?;
        if group.len() <= 1 {
            return Err(EngineError::Conflict(ConflictKind::LastMember));
        }
        let emails = parse_candidates(candidates)?;

        let Partition {
            eligible,
            excluded,
            not_found,
        } = partition(
            self.gather_facts(emails).await?,
            MembershipOp::Remove { group: &group.name },
        );

        let mut to_remove: Vec<Email> = eligible.into_iter().map(|m| m.email).collect();
        if to_remove.is_empty() {
            return Err(EngineError::Conflict(ConflictKind::NoEligibleMembers));
        }

        // Keep the earliest-joined member rather than emptying the group.
        let mut retained = None;
        if group.members.iter().all(|m| to_remove.contains(&m.email)) {
            if let Some(first) = group.members.first() {
                to_remove.retain(|e| e != &first.email);
                retained = Some(first.email.clone());
            }
        }

        let group = self
            .store
            .update_group_members(&group.name, group.version, MembershipChange::Pull(to_remove))
            .await
            .map_err(conflicting_write)?;

        debug!(
            "[tl-03] Group {} now has {} members (retained: {:?})",
            group.name,
            group.len(),
            retained
        );
        Ok(MembershipRemovalReport {
            group,
            not_in_group: excluded,
            members_not_found: not_found,
            retained,
        })
    }

    async fn delete_group(&self, name: &str) -> Result<(), EngineError> {
        require_non_empty(name, "group name")?;
        self.store.delete_group(name, None).await?;
        info!("[tl-03] Deleted group {}", name);
        Ok(())
    }

    async fn create_record(
        &self,
        username: &str,
        category_type: &str,
        amount: f64,
    ) -> Result<Record, EngineError> {
        require_non_empty(username, "username")?;
        require_non_empty(category_type, "category type")?;
        if !amount.is_finite() {
            return Err(EngineError::validation("The amount must be a finite number"));
        }

        if self.store.find_account_by_username(username).await?.is_none() {
            return Err(EngineError::not_found(format!("User {username}")));
        }
        if self.store.find_category_by_type(category_type).await?.is_none() {
            return Err(EngineError::not_found(format!("Category {category_type}")));
        }

        let record = Record::new(username, category_type, amount, self.clock.now_utc());
        self.store
            .insert_record(record.clone())
            .await
            .map_err(conflicting_write)?;

        debug!("[tl-03] Filed record {:?} for {}", record.id, username);
        Ok(record)
    }

    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<Record>, EngineError> {
        Ok(self.store.find_records(filter).await?)
    }

    async fn remove_record(&self, username: &str, id: &str) -> Result<(), EngineError> {
        require_non_empty(username, "username")?;
        if self.store.find_account_by_username(username).await?.is_none() {
            return Err(EngineError::not_found(format!("User {username}")));
        }
        let id = parse_record_id(id)?;

        let record = self
            .store
            .find_records(&RecordFilter::by_ids(vec![id]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::not_found(format!("Record {id}")))?;
        if record.username != username {
            return Err(EngineError::validation(format!(
                "Record {id} does not belong to {username}"
            )));
        }

        self.store.delete_records_by_id(&[id]).await?;
        debug!("[tl-03] Deleted record {} of {}", id, username);
        Ok(())
    }

    async fn remove_records(&self, ids: &[String]) -> Result<u64, EngineError> {
        if ids.is_empty() {
            return Err(EngineError::validation("No records to delete"));
        }
        let ids = ids
            .iter()
            .map(|raw| parse_record_id(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let removed = self.store.delete_records_by_id(&ids).await?;
        info!("[tl-03] Deleted {} records", removed);
        Ok(removed)
    }
}
