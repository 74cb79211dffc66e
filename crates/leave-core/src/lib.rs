//! # leave-core
//!
//! Domain layer for the leave management service: users, leave records, the role
//! resolver, the leave query filter, and the repository ports implemented by the
//! infrastructure crates. Nothing in here touches a database or a web framework.

pub mod access;
pub mod entities;
pub mod error;
pub mod query;
pub mod traits;
pub mod value_objects;

pub use access::{effective_role, is_admin, is_admin_or_manager};
pub use entities::{
    truncate_username, validate_date_range, validate_employee_name, Actor, LeaveRecord, User,
    EMPLOYEE_NAME_MAX_LEN, USERNAME_MAX_LEN,
};
pub use error::DomainError;
pub use query::{
    DateBounds, LeaveFilter, LeaveOrdering, LeaveQuery, LeaveSortField, LeaveStatusCounts,
    NameMatch, Visibility,
};
pub use traits::{LeaveRepository, RepoResult, UserRepository};
pub use value_objects::{
    LeaveStatus, LeaveType, ParseEnumError, Role, Snowflake, SnowflakeGenerator,
    SnowflakeParseError, SocialProvider,
};
