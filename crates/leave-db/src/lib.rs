//! # leave-db
//!
//! Persistence for users and leave records.
//!
//! - [`repositories`]: PostgreSQL implementations over SQLx, with the leave
//!   query filter compiled to SQL through `QueryBuilder`
//! - [`memory`]: process-local implementations with the same semantics, used by
//!   the in-memory backend and by tests
//! - [`pool`]: connection pool and migrations
//!
//! ```rust,ignore
//! use leave_db::{create_pool, run_migrations, PgLeaveRepository};
//!
//! let pool = create_pool(&config.database).await?;
//! run_migrations(&pool).await?;
//! let leaves = PgLeaveRepository::new(pool);
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::{MemoryLeaveRepository, MemoryUserRepository};
pub use pool::{create_pool, health_check, run_migrations, PgPool};
pub use repositories::{PgLeaveRepository, PgUserRepository};
