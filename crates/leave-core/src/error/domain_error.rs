//! Domain errors - the failure taxonomy shared by every layer above the core

use chrono::NaiveDate;
use thiserror::Error;

use crate::value_objects::{LeaveStatus, Role, Snowflake};

#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Leave record not found: {0}")]
    LeaveNotFound(Snowflake),

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Employee name must contain only letters and spaces: '{0}'")]
    InvalidEmployeeName(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Authentication / Authorization
    // =========================================================================
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("You can only modify your own leave requests")]
    NotLeaveOwner,

    #[error("Requires {required} role or higher")]
    InsufficientRole { required: Role },

    // =========================================================================
    // Invalid State
    // =========================================================================
    #[error("Only PENDING leaves can be edited (current status: {0})")]
    LeaveNotEditable(LeaveStatus),

    #[error("Only PENDING or APPROVED leaves can be cancelled (current status: {0})")]
    LeaveNotCancellable(LeaveStatus),

    #[error("Leave has already been decided (current status: {0})")]
    LeaveAlreadyDecided(LeaveStatus),

    // =========================================================================
    // Conflict
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already taken")]
    UsernameAlreadyExists,

    #[error("Social account already linked to another user")]
    SocialAccountAlreadyLinked,

    // =========================================================================
    // Infrastructure (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::LeaveNotFound(_) => "UNKNOWN_LEAVE",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmployeeName(_) => "INVALID_EMPLOYEE_NAME",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::NotLeaveOwner => "NOT_LEAVE_OWNER",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",

            Self::LeaveNotEditable(_)
            | Self::LeaveNotCancellable(_)
            | Self::LeaveAlreadyDecided(_) => "INVALID_STATE",

            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::SocialAccountAlreadyLinked => "SOCIAL_ACCOUNT_ALREADY_LINKED",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::LeaveNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmployeeName(_)
                | Self::InvalidDateRange { .. }
                | Self::WeakPassword(_)
        )
    }

    /// No principal where one is required.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// A principal exists but lacks ownership or role.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotLeaveOwner | Self::InsufficientRole { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::LeaveNotEditable(_) | Self::LeaveNotCancellable(_) | Self::LeaveAlreadyDecided(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists | Self::UsernameAlreadyExists | Self::SocialAccountAlreadyLinked
        )
    }
}
