//! In-memory repositories
//!
//! Same contracts as the PostgreSQL implementations, including case-insensitive
//! uniqueness and the conditional status write. Each repository guards its map
//! with a single `RwLock`, which gives the per-row atomicity the services rely on.

mod leave;
mod user;

pub use leave::MemoryLeaveRepository;
pub use user::MemoryUserRepository;
