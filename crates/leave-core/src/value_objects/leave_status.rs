//! Leave record status and its transition table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// ```text
/// PENDING --edit--> PENDING
/// PENDING --decide--> APPROVED | REJECTED
/// PENDING --cancel--> CANCELLED
/// APPROVED --cancel--> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub const ALL: [LeaveStatus; 4] = [
        LeaveStatus::Pending,
        LeaveStatus::Approved,
        LeaveStatus::Rejected,
        LeaveStatus::Cancelled,
    ];

    /// Statuses a cancellation may start from.
    pub const CANCELLABLE: [LeaveStatus; 2] = [LeaveStatus::Pending, LeaveStatus::Approved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    #[inline]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[inline]
    pub fn is_cancellable(&self) -> bool {
        Self::CANCELLABLE.contains(self)
    }

    /// True for the two outcomes a reviewer may pick.
    #[inline]
    pub fn is_decision(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Pending | Self::Approved | Self::Rejected | Self::Cancelled) => {
                true
            }
            (Self::Approved, Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("leave status", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in [LeaveStatus::Rejected, LeaveStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in LeaveStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_approved_only_cancels() {
        let approved = LeaveStatus::Approved;
        assert!(!approved.is_terminal());
        assert!(approved.can_transition_to(LeaveStatus::Cancelled));
        assert!(!approved.can_transition_to(LeaveStatus::Rejected));
        assert!(!approved.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn test_editable_and_cancellable() {
        assert!(LeaveStatus::Pending.is_editable());
        assert!(!LeaveStatus::Approved.is_editable());
        assert!(LeaveStatus::Approved.is_cancellable());
        assert!(!LeaveStatus::Rejected.is_cancellable());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&LeaveStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        assert_eq!("approved".parse::<LeaveStatus>().unwrap(), LeaveStatus::Approved);
    }
}
