//! Server-side browser sessions.
//!
//! A session id is an opaque random string handed to the browser in a cookie.
//! The store maps it to the user it was created for until it expires or is
//! destroyed.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use leave_core::Snowflake;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::pool::{CacheResult, RedisPool};

const SESSION_PREFIX: &str = "session:";
const USER_SESSIONS_PREFIX: &str = "user_sessions:";

/// Bytes of entropy in a session id.
const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSession {
    pub session_id: String,
    pub user_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl WebSession {
    pub fn new(user_id: Snowflake, ttl_seconds: u64) -> Self {
        let created_at = Utc::now();
        Self {
            session_id: generate_session_id(),
            user_id,
            created_at,
            expires_at: expires_after(created_at, ttl_seconds),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// `start + ttl_seconds`, saturating at the latest representable instant.
pub(crate) fn expires_after(start: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| start.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session for `user_id`.
    async fn create(&self, user_id: Snowflake) -> CacheResult<WebSession>;

    /// Look up a live session. Unknown and expired ids are `None`.
    async fn get(&self, session_id: &str) -> CacheResult<Option<WebSession>>;

    /// End one session. Returns whether it existed.
    async fn destroy(&self, session_id: &str) -> CacheResult<bool>;

    /// End every session belonging to `user_id`.
    async fn destroy_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32>;
}

#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(session_id: &str) -> String {
        format!("{SESSION_PREFIX}{session_id}")
    }

    fn user_key(user_id: Snowflake) -> String {
        format!("{USER_SESSIONS_PREFIX}{user_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Snowflake) -> CacheResult<WebSession> {
        let session = WebSession::new(user_id, self.ttl_seconds);
        self.pool
            .set(&Self::key(&session.session_id), &session, self.ttl_seconds)
            .await?;
        self.pool
            .add_to_set(&Self::user_key(user_id), &session.session_id, self.ttl_seconds)
            .await?;

        tracing::debug!(user_id = %user_id, "Created web session");
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> CacheResult<Option<WebSession>> {
        let session: Option<WebSession> = self.pool.get_value(&Self::key(session_id)).await?;
        Ok(session.filter(|s| !s.is_expired_at(Utc::now())))
    }

    async fn destroy(&self, session_id: &str) -> CacheResult<bool> {
        if let Some(session) = self.pool.get_value::<WebSession>(&Self::key(session_id)).await? {
            self.pool
                .remove_from_set(&Self::user_key(session.user_id), session_id)
                .await?;
        }
        let deleted = self.pool.delete(&Self::key(session_id)).await?;
        if deleted {
            tracing::debug!("Destroyed web session");
        }
        Ok(deleted)
    }

    async fn destroy_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32> {
        let user_key = Self::user_key(user_id);
        let ids = self.pool.set_members(&user_key).await?;
        let keys: Vec<String> = ids.iter().map(|id| Self::key(id)).collect();
        self.pool.delete_many(&keys).await?;
        self.pool.delete(&user_key).await?;

        tracing::info!(user_id = %user_id, count = ids.len(), "Destroyed all web sessions for user");
        Ok(ids.len() as u32)
    }
}
