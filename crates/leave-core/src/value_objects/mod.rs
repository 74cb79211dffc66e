//! Value objects - small immutable types shared by the entities

mod leave_status;
mod leave_type;
mod role;
mod snowflake;
mod social_provider;

pub use leave_status::LeaveStatus;
pub use leave_type::LeaveType;
pub use role::Role;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use social_provider::SocialProvider;

/// Returned when a stored or submitted string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
