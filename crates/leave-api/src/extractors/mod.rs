//! Axum extractors for request handling
//!
//! Custom extractors for the acting principal, validated bodies, path ids
//! and the leave list filter.

mod actor;
mod filter;
mod path;
mod validated;

pub use actor::CurrentActor;
pub use filter::LeaveFilterQuery;
pub use path::PathId;
pub use validated::{OptionalValidatedJson, ValidatedJson};
