//! PostgreSQL repository implementations

mod error;
mod leave;
mod user;

pub use leave::PgLeaveRepository;
pub use user::PgUserRepository;
