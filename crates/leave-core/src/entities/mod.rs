//! Domain entities

mod actor;
mod leave;
mod user;

pub use actor::Actor;
pub use leave::{validate_date_range, validate_employee_name, LeaveRecord, EMPLOYEE_NAME_MAX_LEN};
pub use user::{truncate_username, User, USERNAME_MAX_LEN};
