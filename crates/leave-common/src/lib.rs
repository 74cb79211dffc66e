//! # leave-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

pub use auth::{
    bearer_token, hash_password, validate_password_strength, verify_password, Claims, JwtService,
    TokenPair, TokenType,
};
pub use config::{
    AppConfig, AppSettings, BootstrapAdminConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, JwtConfig, LeavePolicyConfig, OAuthConfig, RateLimitConfig, RedisConfig,
    ServerConfig, SessionConfig, SnowflakeConfig, StorageBackend, StorageConfig,
};
pub use error::{domain_status_code, AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
