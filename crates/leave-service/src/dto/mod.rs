//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    ChangePasswordRequest, DecisionRequest, EditLeaveRequest, GithubLoginRequest,
    GoogleLoginRequest, LoginRequest, LogoutRequest, OAuthCallbackQuery, RefreshTokenRequest,
    RegisterRequest, SubmitLeaveRequest, UpdateRoleRequest,
};

pub use responses::{
    AuthResponse, AuthUrlResponse, HealthChecks, HealthResponse, LeaveListResponse, LeaveResponse,
    LeaveStatsResponse, MessageResponse, ReadinessResponse, UserResponse,
};
