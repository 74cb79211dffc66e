//! Application configuration
//!
//! Everything comes from environment variables (optionally seeded from a `.env`
//! file). The resulting struct is handed to the services at construction time;
//! nothing reads the environment after startup.

use std::env;
use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub storage: StorageConfig,
    /// Present when `storage.backend` is Postgres.
    pub database: Option<DatabaseConfig>,
    /// Present when `storage.backend` is Postgres.
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub oauth: OAuthConfig,
    pub leave: LeavePolicyConfig,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local maps. Data is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub pool_size: usize,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds.
    pub access_token_expiry: i64,
    /// Seconds.
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: u64,
    /// Mark the cookie `Secure`.
    pub secure: bool,
}

/// Client credentials for the identity providers. Unset providers are disabled.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: String,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    pub github_redirect_uri: String,
}

#[derive(Debug, Clone, Default)]
pub struct LeavePolicyConfig {
    /// Let unauthenticated callers submit leave requests under any valid name.
    pub allow_anonymous_submit: bool,
}

/// Superuser created at startup if no account with this email exists.
#[derive(Clone)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Sustained rate across all clients; the bucket refills one request every
    /// `1 / requests_per_second` seconds.
    pub requests_per_second: u32,
    /// Bucket size: requests allowed back to back before the rate applies.
    pub burst: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

fn default_app_name() -> String {
    "leave-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_redis_pool_size() -> usize {
    16
}

/// Upper bound for token and session lifetimes (ten years).
pub const MAX_LIFETIME_SECS: u64 = 315_360_000;

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_session_cookie() -> String {
    "sessionid".to_string()
}

fn default_session_ttl() -> u64 {
    1_209_600 // 14 days
}

fn default_google_redirect() -> String {
    "http://localhost:8000/api/v1/auth/google/callback".to_string()
}

fn default_github_redirect() -> String {
    "http://localhost:3000/auth/github/callback".to_string()
}

fn default_requests_per_second() -> u32 {
    20
}

fn default_burst() -> u32 {
    100
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source(&lookup);

        let env: Environment = source.parsed("APP_ENV")?.unwrap_or_default();
        let backend: StorageBackend = source.parsed("STORAGE_BACKEND")?.unwrap_or_default();

        let (database, redis) = match backend {
            StorageBackend::Memory => (None, None),
            StorageBackend::Postgres => (
                Some(DatabaseConfig {
                    url: source.required("DATABASE_URL")?,
                    max_connections: source
                        .parsed("DATABASE_MAX_CONNECTIONS")?
                        .unwrap_or_else(default_max_connections),
                    min_connections: source
                        .parsed("DATABASE_MIN_CONNECTIONS")?
                        .unwrap_or_else(default_min_connections),
                    run_migrations: source.flag("DATABASE_RUN_MIGRATIONS")?.unwrap_or(true),
                }),
                Some(RedisConfig {
                    url: source.required("REDIS_URL")?,
                    pool_size: source
                        .parsed("REDIS_POOL_SIZE")?
                        .unwrap_or_else(default_redis_pool_size),
                }),
            ),
        };

        let bootstrap_admin = match (
            source.get("BOOTSTRAP_ADMIN_USERNAME"),
            source.get("BOOTSTRAP_ADMIN_EMAIL"),
            source.get("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(BootstrapAdminConfig {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "BOOTSTRAP_ADMIN_*",
                    message: "username, email and password must be set together".to_string(),
                })
            }
        };

        Ok(Self {
            app: AppSettings {
                name: source.get("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: source.get("API_HOST").unwrap_or_else(default_host),
                port: source.parsed("API_PORT")?.unwrap_or_else(default_port),
                request_timeout_secs: source
                    .parsed("API_REQUEST_TIMEOUT_SECS")?
                    .unwrap_or_else(default_request_timeout),
            },
            storage: StorageConfig { backend },
            database,
            redis,
            jwt: JwtConfig {
                secret: source.required("JWT_SECRET")?,
                access_token_expiry: source
                    .lifetime("JWT_ACCESS_TOKEN_EXPIRY")?
                    .map_or_else(default_access_token_expiry, |secs| secs as i64),
                refresh_token_expiry: source
                    .lifetime("JWT_REFRESH_TOKEN_EXPIRY")?
                    .map_or_else(default_refresh_token_expiry, |secs| secs as i64),
            },
            session: SessionConfig {
                cookie_name: source
                    .get("SESSION_COOKIE_NAME")
                    .unwrap_or_else(default_session_cookie),
                ttl_secs: source.lifetime("SESSION_TTL_SECS")?.unwrap_or_else(default_session_ttl),
                secure: source
                    .flag("SESSION_COOKIE_SECURE")?
                    .unwrap_or(env.is_production()),
            },
            oauth: OAuthConfig {
                google_client_id: source.get("GOOGLE_CLIENT_ID"),
                google_client_secret: source.get("GOOGLE_CLIENT_SECRET"),
                google_redirect_uri: source
                    .get("GOOGLE_REDIRECT_URI")
                    .unwrap_or_else(default_google_redirect),
                github_client_id: source.get("GITHUB_CLIENT_ID"),
                github_client_secret: source.get("GITHUB_CLIENT_SECRET"),
                github_redirect_uri: source
                    .get("GITHUB_REDIRECT_URI")
                    .unwrap_or_else(default_github_redirect),
            },
            leave: LeavePolicyConfig {
                allow_anonymous_submit: source.flag("LEAVE_ALLOW_ANONYMOUS_SUBMIT")?.unwrap_or(false),
            },
            bootstrap_admin,
            rate_limit: RateLimitConfig {
                requests_per_second: source
                    .parsed("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: source.parsed("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: source
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: source.parsed("WORKER_ID")?.unwrap_or(0),
            },
        })
    }

    /// Self-contained configuration on the in-memory backend, bound to an
    /// ephemeral port. Used by local demos and the test suites.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Test,
            },
            api: ServerConfig {
                host: default_host(),
                port: 0,
                request_timeout_secs: default_request_timeout(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            database: None,
            redis: None,
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                access_token_expiry: default_access_token_expiry(),
                refresh_token_expiry: default_refresh_token_expiry(),
            },
            session: SessionConfig {
                cookie_name: default_session_cookie(),
                ttl_secs: default_session_ttl(),
                secure: false,
            },
            oauth: OAuthConfig {
                google_redirect_uri: default_google_redirect(),
                github_redirect_uri: default_github_redirect(),
                ..OAuthConfig::default()
            },
            leave: LeavePolicyConfig::default(),
            bootstrap_admin: None,
            rate_limit: RateLimitConfig {
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
            cors: CorsConfig::default(),
            snowflake: SnowflakeConfig::default(),
        }
    }
}

struct Source<'a, F>(&'a F);

impl<F> Source<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parsed<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                    key,
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Seconds, between one second and [`MAX_LIFETIME_SECS`].
    fn lifetime(&self, key: &'static str) -> Result<Option<u64>, ConfigError> {
        match self.parsed::<u64>(key)? {
            Some(secs) if !(1..=MAX_LIFETIME_SECS).contains(&secs) => {
                Err(ConfigError::InvalidValue {
                    key,
                    message: format!("expected 1..={MAX_LIFETIME_SECS} seconds, got {secs}"),
                })
            }
            secs => Ok(secs),
        }
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    key,
                    message: format!("expected a boolean, got '{raw}'"),
                }),
            })
            .transpose()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
