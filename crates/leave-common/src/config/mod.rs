//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BootstrapAdminConfig, ConfigError, CorsConfig, DatabaseConfig,
    Environment, JwtConfig, LeavePolicyConfig, OAuthConfig, RateLimitConfig, RedisConfig,
    ServerConfig, SessionConfig, SnowflakeConfig, StorageBackend, StorageConfig,
};
