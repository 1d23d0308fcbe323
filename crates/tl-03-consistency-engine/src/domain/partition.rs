//! # Group Membership Partition
//!
//! Shared by group creation, member addition and member removal.
//!
//! Candidates are first parsed (structural failures reject the whole
//! request), then each one is classified into exactly one bucket:
//!
//! | Check (in order) | Addition | Removal |
//! |------------------|----------|---------|
//! | no such account | `not_found` | `not_found` |
//! | group membership | `excluded` if in any group | `excluded` if not in this group |
//! | otherwise | `eligible` | `eligible` |
//!
//! The functions here are pure: the service gathers the facts from the store
//! and hands them in.

use super::errors::EngineError;
use shared_types::{AccountId, Email, EmailError, GroupMember};
use std::collections::HashSet;

/// Parse raw candidate emails, dropping repeats but keeping first-seen order.
///
/// Any empty or malformed entry rejects the whole list.
pub fn parse_candidates(raw: &[String]) -> Result<Vec<Email>, EngineError> {
    let mut seen = HashSet::new();
    let mut emails = Vec::with_capacity(raw.len());
    for candidate in raw {
        let email = Email::parse(candidate).map_err(|e| match e {
            EmailError::Empty => {
                EngineError::validation("At least one of the member emails is an empty string")
            }
            EmailError::Malformed(_) => EngineError::validation(
                "At least one of the member emails is not in a valid email format",
            ),
        })?;
        if seen.insert(email.clone()) {
            emails.push(email);
        }
    }
    Ok(emails)
}

/// What the store knows about one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFacts {
    /// The candidate.
    pub email: Email,
    /// The account it names, if any.
    pub account: Option<AccountId>,
    /// The group it currently belongs to, if any.
    pub group: Option<String>,
}

/// The membership operation being partitioned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp<'a> {
    /// Group creation or member addition.
    Add,
    /// Member removal from the named group.
    Remove {
        /// Target group name.
        group: &'a str,
    },
}

/// Three-way classification of a candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Candidates the operation applies to.
    pub eligible: Vec<GroupMember>,
    /// Already in a group (addition) or not in the target group (removal).
    pub excluded: Vec<Email>,
    /// Emails with no account.
    pub not_found: Vec<Email>,
}

impl Partition {
    /// Emails of the eligible members.
    pub fn eligible_emails(&self) -> Vec<Email> {
        self.eligible.iter().map(|m| m.email.clone()).collect()
    }
}

/// Classify every candidate into exactly one bucket, preserving input order
/// within each bucket.
pub fn partition(facts: Vec<CandidateFacts>, op: MembershipOp<'_>) -> Partition {
    let mut result = Partition::default();
    for fact in facts {
        let Some(account_id) = fact.account else {
            result.not_found.push(fact.email);
            continue;
        };
        let excluded = match op {
            MembershipOp::Add => fact.group.is_some(),
            MembershipOp::Remove { group } => fact.group.as_deref() != Some(group),
        };
        if excluded {
            result.excluded.push(fact.email);
        } else {
            result.eligible.push(GroupMember::new(fact.email, account_id));
        }
    }
    result
}
