//! In-process stores with the same expiry semantics as the Redis ones.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leave_core::Snowflake;
use parking_lot::RwLock;

use crate::pool::CacheResult;
use crate::session::{expires_after, RefreshTokenData, RefreshTokenStore, SessionStore, WebSession};

#[derive(Debug)]
pub struct MemorySessionStore {
    ttl_seconds: u64,
    sessions: RwLock<HashMap<String, WebSession>>,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Snowflake) -> CacheResult<WebSession> {
        let session = WebSession::new(user_id, self.ttl_seconds);
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> CacheResult<Option<WebSession>> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .filter(|s| !s.is_expired_at(now))
            .cloned())
    }

    async fn destroy(&self, session_id: &str) -> CacheResult<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }

    async fn destroy_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u32)
    }
}

#[derive(Debug)]
pub struct MemoryRefreshTokenStore {
    ttl_seconds: u64,
    tokens: RwLock<HashMap<String, (RefreshTokenData, DateTime<Utc>)>>,
}

impl MemoryRefreshTokenStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn store(&self, token_id: &str, data: &RefreshTokenData) -> CacheResult<()> {
        let now = Utc::now();
        let mut tokens = self.tokens.write();
        tokens.retain(|_, (_, expires_at)| *expires_at > now);
        tokens.insert(
            token_id.to_string(),
            (data.clone(), expires_after(now, self.ttl_seconds)),
        );
        Ok(())
    }

    async fn validate(&self, token_id: &str) -> CacheResult<Option<RefreshTokenData>> {
        let now = Utc::now();
        Ok(self
            .tokens
            .read()
            .get(token_id)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(data, _)| data.clone()))
    }

    async fn revoke(&self, token_id: &str) -> CacheResult<bool> {
        Ok(self.tokens.write().remove(token_id).is_some())
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake) -> CacheResult<u32> {
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, (data, _)| data.user_id != user_id);
        Ok((before - tokens.len()) as u32)
    }
}
