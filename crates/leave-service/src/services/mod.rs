//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of a
//! request and holds no state of its own.

pub mod auth;
pub mod context;
pub mod error;
pub mod identity;
pub mod leave;
pub mod oauth;
pub mod user;

pub use auth::{AuthService, LoginResult};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use identity::IdentityResolver;
pub use leave::LeaveService;
pub use oauth::OAuthService;
pub use user::UserService;
