//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use leave_core::{RepoResult, Snowflake, SocialProvider, User, UserRepository};

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation, user_conflict};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, is_superuser, \
     is_verified, is_active, social_id, social_provider, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.fetch_one_where("LOWER(email) = LOWER($1)", email).await
    }

    #[instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        self.fetch_one_where(
            "LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($1) \
             ORDER BY (LOWER(email) = LOWER($1)) DESC LIMIT 1",
            login,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> RepoResult<Option<User>> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE social_provider = $1 AND social_id = $2");
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(provider.as_str())
            .bind(social_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn create(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name, role,
                               is_superuser, is_verified, is_active, social_id, social_provider,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.is_superuser)
        .bind(user.is_verified)
        .bind(user.is_active)
        .bind(&user.social_id)
        .bind(user.social_provider.map(|p| p.as_str()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, user_conflict))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET first_name = $2, last_name = $3, role = $4, is_superuser = $5,
                is_verified = $6, is_active = $7, social_id = $8, social_provider = $9,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.is_superuser)
        .bind(user.is_verified)
        .bind(user.is_active)
        .bind(&user.social_id)
        .bind(user.social_provider.map(|p| p.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, user_conflict))?;

        if result.rows_affected() == 0 {
            return Err(leave_core::DomainError::UserNotFound(user.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(hash.flatten())
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(leave_core::DomainError::UserNotFound(id));
        }
        Ok(())
    }
}
