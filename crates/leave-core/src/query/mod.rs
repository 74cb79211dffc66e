//! Leave query filter - role-scoped, conjunctive filtering and ordering

mod leave_filter;

pub use leave_filter::{
    DateBounds, LeaveFilter, LeaveOrdering, LeaveQuery, LeaveSortField, LeaveStatusCounts,
    NameMatch, Visibility,
};
