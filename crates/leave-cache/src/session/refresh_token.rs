//! Refresh token storage.
//!
//! A refresh token is usable only while its `jti` is present in the store.
//! Rotation revokes the old id and stores the new one.

use async_trait::async_trait;
use leave_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::pool::{CacheResult, RedisPool};

const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
const USER_TOKENS_PREFIX: &str = "user_tokens:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenData {
    pub user_id: Snowflake,
    /// Unix epoch seconds.
    pub created_at: i64,
}

impl RefreshTokenData {
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn store(&self, token_id: &str, data: &RefreshTokenData) -> CacheResult<()>;

    /// `None` once the token was revoked or has expired.
    async fn validate(&self, token_id: &str) -> CacheResult<Option<RefreshTokenData>>;

    async fn revoke(&self, token_id: &str) -> CacheResult<bool>;

    /// Logout from all devices.
    async fn revoke_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32>;
}

#[derive(Debug, Clone)]
pub struct RedisRefreshTokenStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisRefreshTokenStore {
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(token_id: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{token_id}")
    }

    fn user_key(user_id: Snowflake) -> String {
        format!("{USER_TOKENS_PREFIX}{user_id}")
    }
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn store(&self, token_id: &str, data: &RefreshTokenData) -> CacheResult<()> {
        self.pool
            .set(&Self::key(token_id), data, self.ttl_seconds)
            .await?;
        // Track per user so all tokens can be revoked together
        self.pool
            .add_to_set(&Self::user_key(data.user_id), token_id, self.ttl_seconds)
            .await?;

        tracing::debug!(token_id = %token_id, user_id = %data.user_id, "Stored refresh token");
        Ok(())
    }

    async fn validate(&self, token_id: &str) -> CacheResult<Option<RefreshTokenData>> {
        self.pool.get_value(&Self::key(token_id)).await
    }

    async fn revoke(&self, token_id: &str) -> CacheResult<bool> {
        if let Some(data) = self.validate(token_id).await? {
            self.pool
                .remove_from_set(&Self::user_key(data.user_id), token_id)
                .await?;
        }

        let deleted = self.pool.delete(&Self::key(token_id)).await?;
        if deleted {
            tracing::debug!(token_id = %token_id, "Revoked refresh token");
        }
        Ok(deleted)
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32> {
        let user_key = Self::user_key(user_id);
        let token_ids = self.pool.set_members(&user_key).await?;
        let keys: Vec<String> = token_ids.iter().map(|id| Self::key(id)).collect();
        self.pool.delete_many(&keys).await?;
        self.pool.delete(&user_key).await?;

        tracing::info!(
            user_id = %user_id,
            count = token_ids.len(),
            "Revoked all refresh tokens for user"
        );
        Ok(token_ids.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_data_creation() {
        let user_id = Snowflake::new(12345);
        let data = RefreshTokenData::new(user_id);

        assert_eq!(data.user_id, user_id);
        assert!(data.created_at > 0);
    }

    #[test]
    fn test_key_generation() {
        assert_eq!(RedisRefreshTokenStore::key("abc123"), "refresh_token:abc123");
        assert_eq!(
            RedisRefreshTokenStore::user_key(Snowflake::new(9)),
            "user_tokens:9"
        );
    }
}
