//! # Record Filters
//!
//! `RecordFilter` is the storage-agnostic predicate used by
//! `find_records` and `delete_records`. `RecordQuery` is the raw query-string
//! form a transport layer hands in; it is validated into a filter here.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Record, RecordId};
use thiserror::Error;

/// Errors raised while turning a [`RecordQuery`] into a [`RecordFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// `date` was combined with `from` or `up_to`.
    #[error("`date` cannot be combined with `from` or `upTo`")]
    DateWithRange,

    /// A date parameter is not `YYYY-MM-DD`.
    #[error("Not a date in the format YYYY-MM-DD: {0}")]
    InvalidDate(String),

    /// An amount bound is not numeric.
    #[error("The {field} value must be numeric, got {value}")]
    InvalidAmount {
        /// Parameter name.
        field: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Raw filtering parameters as received from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    /// A single day.
    pub date: Option<String>,
    /// First day, inclusive.
    pub from: Option<String>,
    /// Last day, inclusive.
    pub up_to: Option<String>,
    /// Minimum amount, inclusive.
    pub min: Option<String>,
    /// Maximum amount, inclusive.
    pub max: Option<String>,
}

/// Conjunctive predicate over records. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Owning username.
    pub username: Option<String>,
    /// Any of these owners. Used for group-wide reads.
    pub usernames: Option<Vec<String>>,
    /// Any of these record ids.
    pub ids: Option<Vec<RecordId>>,
    /// Category type label.
    pub category_type: Option<String>,
    /// Earliest timestamp, inclusive.
    pub date_from: Option<DateTime<Utc>>,
    /// Latest timestamp, inclusive.
    pub date_to: Option<DateTime<Utc>>,
    /// Minimum amount, inclusive.
    pub min_amount: Option<f64>,
    /// Maximum amount, inclusive.
    pub max_amount: Option<f64>,
}

impl RecordFilter {
    /// Match every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records owned by `username`.
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// Match records filed under `category_type`.
    pub fn by_category(category_type: impl Into<String>) -> Self {
        Self {
            category_type: Some(category_type.into()),
            ..Self::default()
        }
    }

    /// Match records owned by any of `usernames`.
    pub fn by_usernames(usernames: Vec<String>) -> Self {
        Self {
            usernames: Some(usernames),
            ..Self::default()
        }
    }

    /// Match the records with these ids.
    pub fn by_ids(ids: Vec<RecordId>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    /// Narrow by owner.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Narrow by category.
    pub fn with_category(mut self, category_type: impl Into<String>) -> Self {
        self.category_type = Some(category_type.into());
        self
    }

    /// Build a filter from raw query parameters.
    ///
    /// `date` selects one whole day and is exclusive with `from`/`up_to`.
    /// `from` starts at 00:00:00 and `up_to` ends at 23:59:59, both UTC.
    pub fn from_query(query: &RecordQuery) -> Result<Self, FilterError> {
        let mut filter = Self::default();

        if query.date.is_some() && (query.from.is_some() || query.up_to.is_some()) {
            return Err(FilterError::DateWithRange);
        }

        if let Some(date) = &query.date {
            let day = parse_day(date)?;
            filter.date_from = Some(start_of_day(day));
            filter.date_to = Some(end_of_day(day));
        }
        if let Some(from) = &query.from {
            filter.date_from = Some(start_of_day(parse_day(from)?));
        }
        if let Some(up_to) = &query.up_to {
            filter.date_to = Some(end_of_day(parse_day(up_to)?));
        }
        if let Some(min) = &query.min {
            filter.min_amount = Some(parse_amount("min", min)?);
        }
        if let Some(max) = &query.max {
            filter.max_amount = Some(parse_amount("max", max)?);
        }

        Ok(filter)
    }

    /// Whether the record satisfies every set bound.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(username) = &self.username {
            if &record.username != username {
                return false;
            }
        }
        if let Some(usernames) = &self.usernames {
            if !usernames.contains(&record.username) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&record.id) {
                return false;
            }
        }
        if let Some(category_type) = &self.category_type {
            if &record.category_type != category_type {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.date > to {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if record.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if record.amount > max {
                return false;
            }
        }
        true
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate(raw.to_string()))
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    // 23:59:59 is always a valid time of day.
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(end))
}

fn parse_amount(field: &'static str, raw: &str) -> Result<f64, FilterError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FilterError::InvalidAmount {
            field,
            value: raw.to_string(),
        })
}
