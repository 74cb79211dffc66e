//! # leave-service
//!
//! Application layer: the leave lifecycle, request identity resolution,
//! authentication flows and the DTOs the HTTP layer serializes.
//!
//! Services borrow a [`ServiceContext`] and are created per call:
//!
//! ```ignore
//! let actor = IdentityResolver::new(&ctx).resolve(authorization, session_id).await?;
//! let leave = LeaveService::new(&ctx).submit(&actor, request).await?;
//! ```

pub mod dto;
pub mod providers;
pub mod services;

pub use providers::{ExternalIdentity, GithubClient, GoogleClient, IdentityProvider, OAuthGrant};
pub use services::{
    AuthService, IdentityResolver, LeaveService, LoginResult, OAuthService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
