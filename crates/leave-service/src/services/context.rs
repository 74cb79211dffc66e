//! Service context - dependency container for services
//!
//! Holds the repositories, session and token stores, token issuer and
//! identity providers. Built once at startup for whichever storage backend
//! is configured.

use std::sync::Arc;

use leave_cache::{RedisPool, RefreshTokenStore, SessionStore};
use leave_common::{AppConfig, JwtService};
use leave_core::{LeaveRepository, Snowflake, SnowflakeGenerator, SocialProvider, UserRepository};
use leave_db::PgPool;

use super::error::{ServiceError, ServiceResult};
use crate::providers::IdentityProvider;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    config: Arc<AppConfig>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    leave_repo: Arc<dyn LeaveRepository>,

    // Cache stores
    session_store: Arc<dyn SessionStore>,
    refresh_token_store: Arc<dyn RefreshTokenStore>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    google: Option<Arc<dyn IdentityProvider>>,
    github: Option<Arc<dyn IdentityProvider>>,

    // Present only on the Postgres/Redis backend; probed by readiness checks
    pg_pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    pub fn config(&self) -> &AppConfig {
        self.config.as_ref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn leave_repo(&self) -> &dyn LeaveRepository {
        self.leave_repo.as_ref()
    }

    // === Cache Stores ===

    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    pub fn refresh_token_store(&self) -> &dyn RefreshTokenStore {
        self.refresh_token_store.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// The configured client for `provider`, if its credentials were supplied.
    pub fn identity_provider(&self, provider: SocialProvider) -> Option<&dyn IdentityProvider> {
        match provider {
            SocialProvider::Google => self.google.as_deref(),
            SocialProvider::Github => self.github.as_deref(),
        }
    }

    // === Infrastructure ===

    pub fn pg_pool(&self) -> Option<&PgPool> {
        self.pg_pool.as_ref()
    }

    pub fn redis_pool(&self) -> Option<&RedisPool> {
        self.redis_pool.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("backend", &self.config.storage.backend)
            .field("google", &self.google.is_some())
            .field("github", &self.github.is_some())
            .field("repositories", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    config: Option<Arc<AppConfig>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    leave_repo: Option<Arc<dyn LeaveRepository>>,
    session_store: Option<Arc<dyn SessionStore>>,
    refresh_token_store: Option<Arc<dyn RefreshTokenStore>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    google: Option<Arc<dyn IdentityProvider>>,
    github: Option<Arc<dyn IdentityProvider>>,
    pg_pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Arc<AppConfig>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn leave_repo(mut self, repo: Arc<dyn LeaveRepository>) -> Self {
        self.leave_repo = Some(repo);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn refresh_token_store(mut self, store: Arc<dyn RefreshTokenStore>) -> Self {
        self.refresh_token_store = Some(store);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn google(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.google = Some(provider);
        self
    }

    pub fn github(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.github = Some(provider);
        self
    }

    pub fn pg_pool(mut self, pool: PgPool) -> Self {
        self.pg_pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        let config = required(self.config, "config")?;
        let jwt_service = match self.jwt_service {
            Some(service) => service,
            None => Arc::new(JwtService::from_config(&config.jwt)),
        };
        let snowflake_generator = match self.snowflake_generator {
            Some(generator) => generator,
            None => Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)),
        };

        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            leave_repo: required(self.leave_repo, "leave_repo")?,
            session_store: required(self.session_store, "session_store")?,
            refresh_token_store: required(self.refresh_token_store, "refresh_token_store")?,
            jwt_service,
            snowflake_generator,
            google: self.google,
            github: self.github,
            pg_pool: self.pg_pool,
            redis_pool: self.redis_pool,
            config,
        })
    }
}
