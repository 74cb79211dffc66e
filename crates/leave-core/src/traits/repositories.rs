//! Repository traits (ports) - the storage contracts the services depend on
//!
//! PostgreSQL and in-memory implementations live in the database crate. Both
//! must honour the same semantics, including the conditional status write.

use async_trait::async_trait;

use crate::entities::{LeaveRecord, User};
use crate::error::DomainError;
use crate::query::{LeaveQuery, LeaveStatusCounts, Visibility};
use crate::value_objects::{LeaveStatus, Snowflake, SocialProvider};

pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Case-insensitive lookup by email or username, email first.
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<User>>;

    async fn find_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> RepoResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Insert a user. Social accounts have no password hash.
    ///
    /// Fails with a conflict error when email, username or social link is taken.
    async fn create(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()>;

    /// Persist profile, role, verification and social-link changes.
    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;
}

// ============================================================================
// Leave Repository
// ============================================================================

#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<LeaveRecord>>;

    /// Visible, filtered, ordered records. Each call re-reads the store.
    async fn find(&self, query: &LeaveQuery) -> RepoResult<Vec<LeaveRecord>>;

    async fn count_by_status(&self, visibility: &Visibility) -> RepoResult<LeaveStatusCounts>;

    async fn create(&self, record: &LeaveRecord) -> RepoResult<()>;

    /// Write every mutable column of `record`, but only if the stored status is
    /// one of `expected`. Returns `false` when the precondition did not hold
    /// (another request won the race, or the record vanished).
    async fn update_if_status(
        &self,
        record: &LeaveRecord,
        expected: &[LeaveStatus],
    ) -> RepoResult<bool>;
}
