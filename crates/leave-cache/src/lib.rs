//! # leave-cache
//!
//! Short-lived authentication state: browser sessions and refresh tokens.
//!
//! Each store is a trait with a Redis implementation for deployments and an
//! in-memory implementation for single-process runs and tests.
//!
//! ## Example
//!
//! ```ignore
//! use leave_cache::{RedisPool, RedisSessionStore, SessionStore};
//!
//! let pool = RedisPool::from_config(&config.redis)?;
//! let sessions = RedisSessionStore::new(pool, config.session.ttl_secs);
//!
//! let session = sessions.create(user.id).await?;
//! assert_eq!(sessions.get(&session.session_id).await?.map(|s| s.user_id), Some(user.id));
//! ```

pub mod memory;
pub mod pool;
pub mod session;

pub use memory::{MemoryRefreshTokenStore, MemorySessionStore};
pub use pool::{CacheError, CacheResult, RedisPool, RedisPoolConfig};
pub use session::{
    generate_session_id, RedisRefreshTokenStore, RedisSessionStore, RefreshTokenData,
    RefreshTokenStore, SessionStore, WebSession,
};
