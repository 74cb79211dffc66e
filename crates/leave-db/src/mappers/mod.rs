//! Row model -> entity conversions
//!
//! Enum columns are stored as text, so conversion can fail on a corrupt row.

mod leave;
mod user;

use leave_core::{DomainError, ParseEnumError};

fn corrupt_column(table: &str, err: &ParseEnumError) -> DomainError {
    DomainError::DatabaseError(format!("corrupt {table} row: {err}"))
}
