//! Redis connection pool module.

mod redis_pool;

pub use redis_pool::{CacheError, CacheResult, RedisPool, RedisPoolConfig};
