//! Redis connection pool using deadpool-redis.

use deadpool_redis::{Config, Pool, Runtime};
use leave_core::DomainError;
use redis::AsyncCommands;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&leave_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &leave_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.pool_size,
        }
    }
}

/// Errors raised by the session and token stores.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> CacheResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| CacheError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CacheError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &leave_common::RedisConfig) -> CacheResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(CacheError::GetConnection)
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> CacheResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store a JSON value under `key` with a TTL in seconds.
    pub async fn set<V: serde::Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let mut conn = self.get().await?;
        let serialized = serde_json::to_string(value)?;
        conn.set_ex::<_, _, ()>(key, &serialized, ttl_seconds).await?;
        Ok(())
    }

    pub async fn get_value<V: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> CacheResult<Option<V>> {
        let mut conn = self.get().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.get().await?;
        let deleted: i32 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    pub async fn delete_many(&self, keys: &[String]) -> CacheResult<i32> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get().await?;
        let deleted: i32 = conn.del(keys).await?;
        Ok(deleted)
    }

    /// Add `member` to the set at `key` and push the set's expiry out to `ttl_seconds`.
    pub async fn add_to_set(&self, key: &str, member: &str, ttl_seconds: u64) -> CacheResult<()> {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let mut conn = self.get().await?;
        conn.sadd::<_, _, ()>(key, member).await?;
        conn.expire::<_, ()>(key, ttl).await?;
        Ok(())
    }

    pub async fn remove_from_set(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut conn = self.get().await?;
        conn.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    pub async fn set_members(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.get().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }
}
