//! Request-supplied filter and sort parameters, translated into a typed query.
//!
//! The same [`LeaveQuery`] drives both the SQL builder in the database crate and
//! the in-memory predicate below, so the two backends cannot drift apart.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::entities::{Actor, LeaveRecord};
use crate::error::DomainError;
use crate::value_objects::{LeaveStatus, LeaveType};

/// Which records an actor may see at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Managers and admins.
    All,
    /// Records whose `employee_name` equals the handle.
    OwnedBy(String),
    /// Anonymous actors.
    Nothing,
}

impl Visibility {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.handle() {
            None => Self::Nothing,
            Some(_) if actor.is_privileged() => Self::All,
            Some(handle) => Self::OwnedBy(handle.to_string()),
        }
    }

    pub fn admits(&self, record: &LeaveRecord) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(handle) => record.employee_name == *handle,
            Self::Nothing => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    Exact(String),
    Contains(String),
    IContains(String),
    StartsWith(String),
    EndsWith(String),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(value) => name == value,
            Self::Contains(value) => name.contains(value.as_str()),
            Self::IContains(value) => name.to_lowercase().contains(&value.to_lowercase()),
            Self::StartsWith(value) => name.starts_with(value.as_str()),
            Self::EndsWith(value) => name.ends_with(value.as_str()),
        }
    }
}

/// Exact and inclusive bounds on one date column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    pub exact: Option<NaiveDate>,
    pub gte: Option<NaiveDate>,
    pub lte: Option<NaiveDate>,
}

impl DateBounds {
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.exact.map_or(true, |d| date == d)
            && self.gte.map_or(true, |d| date >= d)
            && self.lte.map_or(true, |d| date <= d)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.gte.is_none() && self.lte.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaveSortField {
    #[default]
    StartDate,
    EndDate,
    EmployeeName,
    AppliedOn,
}

impl LeaveSortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "start_date" => Some(Self::StartDate),
            "end_date" => Some(Self::EndDate),
            "employee_name" => Some(Self::EmployeeName),
            "applied_on" => Some(Self::AppliedOn),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::EmployeeName => "employee_name",
            Self::AppliedOn => "applied_on",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOrdering {
    pub field: LeaveSortField,
    pub descending: bool,
}

impl Default for LeaveOrdering {
    /// Newest leave first.
    fn default() -> Self {
        Self {
            field: LeaveSortField::StartDate,
            descending: true,
        }
    }
}

impl LeaveOrdering {
    /// `field` or `-field`. Unknown fields fall back to the default.
    pub fn parse_or_default(raw: &str) -> Self {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        LeaveSortField::parse(name).map_or_else(Self::default, |field| Self { field, descending })
    }

    /// Sort key comparison, ties broken by ascending id.
    pub fn compare(&self, a: &LeaveRecord, b: &LeaveRecord) -> Ordering {
        let primary = match self.field {
            LeaveSortField::StartDate => a.start_date.cmp(&b.start_date),
            LeaveSortField::EndDate => a.end_date.cmp(&b.end_date),
            LeaveSortField::EmployeeName => a.employee_name.cmp(&b.employee_name),
            LeaveSortField::AppliedOn => a.applied_on.cmp(&b.applied_on),
        };
        let primary = if self.descending { primary.reverse() } else { primary };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Conjunction of every recognized filter option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    pub employee_name: Vec<NameMatch>,
    pub leave_type: Option<LeaveType>,
    pub status: Option<LeaveStatus>,
    pub start_date: DateBounds,
    pub end_date: DateBounds,
    /// Case-insensitive substring on employee name.
    pub search: Option<String>,
    pub ordering: LeaveOrdering,
}

impl LeaveFilter {
    /// Build a filter from raw key/value pairs such as a query string.
    ///
    /// Keys are matched case-insensitively and unknown keys are ignored. Empty
    /// values are skipped. A recognized key with an unparseable value is a
    /// validation error.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();

        for (key, value) in params {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let owned = || value.to_string();

            match key.as_str() {
                "employee_name" | "employee_name__exact" => {
                    filter.employee_name.push(NameMatch::Exact(owned()));
                }
                "employee_name__contains" => filter.employee_name.push(NameMatch::Contains(owned())),
                "employee_name__icontains" => {
                    filter.employee_name.push(NameMatch::IContains(owned()));
                }
                "employee_name__startswith" => {
                    filter.employee_name.push(NameMatch::StartsWith(owned()));
                }
                "employee_name__endswith" => filter.employee_name.push(NameMatch::EndsWith(owned())),
                "leave_type" => filter.leave_type = Some(parse_value(&key, value)?),
                "status" => filter.status = Some(parse_value(&key, value)?),
                "start_date" | "start_date__exact" => {
                    filter.start_date.exact = Some(parse_date(&key, value)?);
                }
                "start_date__gte" => filter.start_date.gte = Some(parse_date(&key, value)?),
                "start_date__lte" => filter.start_date.lte = Some(parse_date(&key, value)?),
                "end_date" | "end_date__exact" => {
                    filter.end_date.exact = Some(parse_date(&key, value)?);
                }
                "end_date__gte" => filter.end_date.gte = Some(parse_date(&key, value)?),
                "end_date__lte" => filter.end_date.lte = Some(parse_date(&key, value)?),
                "search" => filter.search = Some(owned()),
                "ordering" => filter.ordering = LeaveOrdering::parse_or_default(value),
                _ => {}
            }
        }

        Ok(filter)
    }

    pub fn matches(&self, record: &LeaveRecord) -> bool {
        self.employee_name.iter().all(|m| m.matches(&record.employee_name))
            && self.leave_type.map_or(true, |t| record.leave_type == t)
            && self.status.map_or(true, |s| record.status == s)
            && self.start_date.matches(record.start_date)
            && self.end_date.matches(record.end_date)
            && self.search.as_ref().map_or(true, |term| {
                NameMatch::IContains(term.clone()).matches(&record.employee_name)
            })
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DomainError::ValidationError(format!("{key}: {e}")))
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        DomainError::ValidationError(format!("{key}: expected a date in YYYY-MM-DD format"))
    })
}

/// What a store needs to answer a listing: who is asking and what they asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveQuery {
    pub visibility: Visibility,
    pub filter: LeaveFilter,
}

impl LeaveQuery {
    pub fn new(visibility: Visibility, filter: LeaveFilter) -> Self {
        Self { visibility, filter }
    }

    pub fn for_actor(actor: &Actor, filter: LeaveFilter) -> Self {
        Self::new(Visibility::for_actor(actor), filter)
    }

    pub fn matches(&self, record: &LeaveRecord) -> bool {
        self.visibility.admits(record) && self.filter.matches(record)
    }

    /// Filter and order an in-memory slice.
    pub fn apply<'a, I>(&self, records: I) -> Vec<LeaveRecord>
    where
        I: IntoIterator<Item = &'a LeaveRecord>,
    {
        let mut selected: Vec<LeaveRecord> =
            records.into_iter().filter(|r| self.matches(r)).cloned().collect();
        selected.sort_by(|a, b| self.filter.ordering.compare(a, b));
        selected
    }
}

/// Per-status counts over a visible set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveStatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub cancelled: u64,
}

impl LeaveStatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.approved + self.rejected + self.cancelled
    }

    pub fn record(&mut self, status: LeaveStatus, count: u64) {
        match status {
            LeaveStatus::Pending => self.pending += count,
            LeaveStatus::Approved => self.approved += count,
            LeaveStatus::Rejected => self.rejected += count,
            LeaveStatus::Cancelled => self.cancelled += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;
    use crate::value_objects::{Role, Snowflake};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: i64, name: &str, kind: LeaveType, start: &str, end: &str) -> LeaveRecord {
        LeaveRecord::new(Snowflake::new(id), name.to_string(), kind, date(start), date(end)).unwrap()
    }

    fn sample() -> Vec<LeaveRecord> {
        let mut approved = record(3, "Meera Nair", LeaveType::Earned, "2024-03-01", "2024-03-05");
        approved.status = LeaveStatus::Approved;
        vec![
            record(1, "Akshay", LeaveType::Sick, "2024-01-15", "2024-01-16"),
            record(2, "Akshay", LeaveType::Casual, "2024-02-10", "2024-02-10"),
            approved,
            record(4, "Ravi", LeaveType::Sick, "2024-02-10", "2024-02-12"),
        ]
    }

    fn ids(records: &[LeaveRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id.into_inner()).collect()
    }

    fn actor(username: &str, role: Role) -> Actor {
        let mut user = User::new(Snowflake::new(99), username.to_string(), format!("{username}@x.io"));
        user.role = role;
        Actor::from(user)
    }

    #[test]
    fn test_default_ordering_is_start_date_desc_then_id() {
        let query = LeaveQuery::new(Visibility::All, LeaveFilter::default());
        assert_eq!(ids(&query.apply(&sample())), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_visibility_by_role() {
        assert_eq!(Visibility::for_actor(&Actor::Anonymous), Visibility::Nothing);
        assert_eq!(Visibility::for_actor(&actor("Ravi", Role::Manager)), Visibility::All);
        assert_eq!(
            Visibility::for_actor(&actor("Ravi", Role::Employee)),
            Visibility::OwnedBy("Ravi".to_string())
        );

        let records = sample();
        let own = LeaveQuery::for_actor(&actor("Akshay", Role::Employee), LeaveFilter::default());
        assert_eq!(ids(&own.apply(&records)), vec![2, 1]);

        let anonymous = LeaveQuery::for_actor(&Actor::Anonymous, LeaveFilter::default());
        assert!(anonymous.apply(&records).is_empty());
    }

    #[test]
    fn test_filters_compose_conjunctively() {
        let filter = LeaveFilter::from_params([
            ("Employee_Name__icontains", "aks"),
            ("Leave_Type", "SICK"),
            ("Start_Date__gte", "2024-01-01"),
        ])
        .unwrap();
        let query = LeaveQuery::new(Visibility::All, filter);
        assert_eq!(ids(&query.apply(&sample())), vec![1]);
    }

    #[test]
    fn test_name_match_variants() {
        let records = sample();
        let run = |key: &str, value: &str| {
            let filter = LeaveFilter::from_params([(key, value)]).unwrap();
            ids(&LeaveQuery::new(Visibility::All, filter).apply(&records))
        };

        assert_eq!(run("employee_name", "Ravi"), vec![4]);
        assert_eq!(run("employee_name__contains", "Nair"), vec![3]);
        assert!(run("employee_name__contains", "nair").is_empty());
        assert_eq!(run("employee_name__icontains", "nair"), vec![3]);
        assert_eq!(run("employee_name__startswith", "Ak"), vec![2, 1]);
        assert_eq!(run("employee_name__endswith", "vi"), vec![4]);
        assert_eq!(run("search", "MEERA"), vec![3]);
    }

    #[test]
    fn test_date_bounds_and_status() {
        let filter = LeaveFilter::from_params([
            ("end_date__lte", "2024-02-12"),
            ("start_date__gte", "2024-02-01"),
            ("ordering", "employee_name"),
        ])
        .unwrap();
        let query = LeaveQuery::new(Visibility::All, filter);
        assert_eq!(ids(&query.apply(&sample())), vec![2, 4]);

        let filter = LeaveFilter::from_params([("status", "approved")]).unwrap();
        assert_eq!(ids(&LeaveQuery::new(Visibility::All, filter).apply(&sample())), vec![3]);

        let filter = LeaveFilter::from_params([("start_date", "2024-02-10")]).unwrap();
        assert_eq!(ids(&LeaveQuery::new(Visibility::All, filter).apply(&sample())), vec![2, 4]);
    }

    #[test]
    fn test_unknown_keys_and_empty_values_are_ignored() {
        let filter = LeaveFilter::from_params([
            ("page", "2"),
            ("format", "json"),
            ("status", ""),
        ])
        .unwrap();
        assert_eq!(filter, LeaveFilter::default());
    }

    #[test]
    fn test_bad_values_are_validation_errors() {
        let err = LeaveFilter::from_params([("start_date__gte", "15/01/2024")]).unwrap_err();
        assert!(err.is_validation());

        let err = LeaveFilter::from_params([("leave_type", "VACATION")]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!(
            LeaveOrdering::parse_or_default("end_date"),
            LeaveOrdering { field: LeaveSortField::EndDate, descending: false }
        );
        assert_eq!(
            LeaveOrdering::parse_or_default("-Employee_Name"),
            LeaveOrdering { field: LeaveSortField::EmployeeName, descending: true }
        );
        assert_eq!(LeaveOrdering::parse_or_default("password"), LeaveOrdering::default());
    }

    #[test]
    fn test_status_counts() {
        let mut counts = LeaveStatusCounts::default();
        counts.record(LeaveStatus::Pending, 2);
        counts.record(LeaveStatus::Approved, 1);
        counts.record(LeaveStatus::Cancelled, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.rejected, 0);
    }
}
