//! SQLx error translation

use leave_core::DomainError;
use sqlx::Error as SqlxError;

pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Unique violations go to `on_unique` with the violated constraint name;
/// everything else is a database error.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    map_db_error(e)
}

/// Which user uniqueness rule a constraint name enforces.
pub fn user_conflict(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(name) if name.contains("username") => DomainError::UsernameAlreadyExists,
        Some(name) if name.contains("social") => DomainError::SocialAccountAlreadyLinked,
        _ => DomainError::EmailAlreadyExists,
    }
}
