//! Leave record entity and its lifecycle transitions

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::DomainError;
use crate::value_objects::{LeaveStatus, LeaveType, Snowflake};

pub const EMPLOYEE_NAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRecord {
    pub id: Snowflake,
    /// Handle of the owning principal.
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub applied_on: DateTime<Utc>,
    pub cancelled_by: Option<String>,
    pub cancelled_on: Option<DateTime<Utc>>,
}

impl LeaveRecord {
    /// New PENDING record. The employee name is taken as given; validating it is
    /// the caller's job because a forced owner handle is never re-validated.
    pub fn new(
        id: Snowflake,
        employee_name: String,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        validate_date_range(start_date, end_date)?;
        Ok(Self {
            id,
            employee_name,
            leave_type,
            start_date,
            end_date,
            status: LeaveStatus::Pending,
            applied_on: Utc::now(),
            cancelled_by: None,
            cancelled_on: None,
        })
    }

    #[inline]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    #[inline]
    pub fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }

    /// Inclusive day count.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Overwrite type and dates of a PENDING record.
    pub fn edit(
        &mut self,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), DomainError> {
        if !self.is_editable() {
            return Err(DomainError::LeaveNotEditable(self.status));
        }
        validate_date_range(start_date, end_date)?;

        self.leave_type = leave_type;
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(())
    }

    pub fn cancel(&mut self, cancelled_by: &str, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_cancellable() {
            return Err(DomainError::LeaveNotCancellable(self.status));
        }

        self.status = LeaveStatus::Cancelled;
        self.cancelled_by = Some(cancelled_by.to_string());
        self.cancelled_on = Some(at);
        Ok(())
    }

    /// Apply a reviewer's decision. Only APPROVED and REJECTED are decisions.
    pub fn decide(&mut self, decision: LeaveStatus) -> Result<(), DomainError> {
        if !decision.is_decision() {
            return Err(DomainError::ValidationError(format!(
                "decision must be APPROVED or REJECTED, got {decision}"
            )));
        }
        if self.status != LeaveStatus::Pending {
            return Err(DomainError::LeaveAlreadyDecided(self.status));
        }

        self.status = decision;
        Ok(())
    }
}

/// Letters and spaces only, at least one letter, at most 50 characters.
pub fn validate_employee_name(name: &str) -> Result<(), DomainError> {
    let letters: Vec<char> = name.chars().filter(|c| *c != ' ').collect();
    let well_formed = !letters.is_empty()
        && letters.iter().all(|c| c.is_alphabetic())
        && name.chars().count() <= EMPLOYEE_NAME_MAX_LEN;

    if well_formed {
        Ok(())
    } else {
        Err(DomainError::InvalidEmployeeName(name.to_string()))
    }
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    if start > end {
        return Err(DomainError::InvalidDateRange { start, end });
    }
    Ok(())
}
