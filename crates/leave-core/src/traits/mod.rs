mod repositories;

pub use repositories::{LeaveRepository, RepoResult, UserRepository};
