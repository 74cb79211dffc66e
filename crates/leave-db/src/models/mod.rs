//! Row models with SQLx `FromRow` derives

mod leave;
mod user;

pub use leave::LeaveRecordModel;
pub use user::UserModel;
