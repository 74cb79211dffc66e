//! Connection pool management

mod postgres;

pub use postgres::{create_pool, health_check, run_migrations, PgPool};
