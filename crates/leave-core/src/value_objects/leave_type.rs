use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Sick,
    Casual,
    Earned,
}

impl LeaveType {
    pub const ALL: [LeaveType; 3] = [LeaveType::Sick, LeaveType::Casual, LeaveType::Earned];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "SICK",
            Self::Casual => "CASUAL",
            Self::Earned => "EARNED",
        }
    }

    /// Human label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sick => "Sick Leave",
            Self::Casual => "Casual Leave",
            Self::Earned => "Earned Leave",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("leave type", s))
    }
}
