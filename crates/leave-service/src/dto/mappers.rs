//! Entity to DTO mappers

use leave_core::{effective_role, LeaveRecord, LeaveStatusCounts, User};

use super::responses::{LeaveResponse, LeaveStatsResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            effective_role: effective_role(user),
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
            is_active: user.is_active,
            social_provider: user.social_provider,
            created_at: user.created_at,
        }
    }
}

impl From<&LeaveRecord> for LeaveResponse {
    fn from(record: &LeaveRecord) -> Self {
        Self {
            id: record.id.to_string(),
            employee_name: record.employee_name.clone(),
            leave_type: record.leave_type,
            leave_type_display: record.leave_type.label().to_string(),
            start_date: record.start_date,
            end_date: record.end_date,
            duration_days: record.duration_days(),
            status: record.status,
            applied_on: record.applied_on,
            cancelled_by: record.cancelled_by.clone(),
            cancelled_on: record.cancelled_on,
            is_editable: record.is_editable(),
            is_cancellable: record.is_cancellable(),
        }
    }
}

impl From<LeaveRecord> for LeaveResponse {
    fn from(record: LeaveRecord) -> Self {
        Self::from(&record)
    }
}

impl From<LeaveStatusCounts> for LeaveStatsResponse {
    fn from(counts: LeaveStatusCounts) -> Self {
        Self {
            total: counts.total(),
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
            cancelled: counts.cancelled,
        }
    }
}
