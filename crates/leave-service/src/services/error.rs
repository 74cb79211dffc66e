//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use leave_cache::CacheError;
use leave_common::{domain_status_code, AppError};
use leave_core::DomainError;
use thiserror::Error;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Application error (auth, validation, etc.)
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// No resolvable principal where one is required
    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not legal in the record's current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => domain_status_code(e),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Unauthorized => 401,
            Self::Validation(_) => 400,
            Self::InvalidState(_) | Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized => "AUTHENTICATION_REQUIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Unauthorized => AppError::MissingAuth,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::InvalidState(msg) | ServiceError::Conflict(msg) => {
                AppError::Conflict(msg)
            }
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use leave_core::{LeaveStatus, Role, Snowflake};

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("User", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("User not found: 123"));
    }

    #[test]
    fn test_source_is_the_wrapped_error() {
        use std::error::Error as _;

        let err = ServiceError::from(DomainError::NotLeaveOwner);
        assert_eq!(
            err.source().map(ToString::to_string),
            Some(DomainError::NotLeaveOwner.to_string())
        );
        assert!(ServiceError::Unauthorized.source().is_none());
    }

    #[test]
    fn test_unauthorized_error() {
        let err = ServiceError::Unauthorized;
        assert_eq!(err.status_code(), 401);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 401);
    }

    #[test]
    fn test_domain_errors_keep_their_status() {
        let cases = [
            (DomainError::LeaveNotFound(Snowflake::new(1)), 404),
            (DomainError::InvalidEmployeeName("Akshay123".to_string()), 400),
            (DomainError::NotLeaveOwner, 403),
            (DomainError::InsufficientRole { required: Role::Manager }, 403),
            (DomainError::LeaveNotCancellable(LeaveStatus::Rejected), 409),
            (DomainError::EmailAlreadyExists, 409),
            (DomainError::AuthenticationRequired, 401),
        ];
        for (err, status) in cases {
            assert_eq!(ServiceError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_invalid_state_code() {
        let err = ServiceError::from(DomainError::LeaveNotEditable(LeaveStatus::Approved));
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::validation("bad").into();
        assert_eq!(app_err.status_code(), 400);
    }
}
