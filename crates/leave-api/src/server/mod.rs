//! Server setup and initialization
//!
//! Wires the configured storage backend into a `ServiceContext`, seeds the
//! bootstrap admin and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use leave_cache::{
    MemoryRefreshTokenStore, MemorySessionStore, RedisPool, RedisRefreshTokenStore,
    RedisSessionStore,
};
use leave_common::{AppConfig, AppError, StorageBackend};
use leave_db::{
    create_pool, run_migrations, MemoryLeaveRepository, MemoryUserRepository, PgLeaveRepository,
    PgUserRepository,
};
use leave_service::{AuthService, GithubClient, GoogleClient, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_common_layers, apply_middleware};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config().clone();

    let api = apply_middleware(create_router(), &config)?;
    let health = apply_common_layers(health_routes(), &config);

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = match config.storage.backend {
        StorageBackend::Memory => memory_backend(&config),
        StorageBackend::Postgres => postgres_backend(&config).await?,
    };
    let builder = with_identity_providers(builder, &config)?;

    let service_context = builder
        .config(Arc::new(config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    if let Some(admin) = &service_context.config().bootstrap_admin {
        AuthService::new(&service_context)
            .bootstrap_admin(admin)
            .await
            .map_err(|e| AppError::Config(format!("Bootstrap admin failed: {e}")))?;
    }

    Ok(AppState::new(service_context))
}

fn memory_backend(config: &AppConfig) -> ServiceContextBuilder {
    info!("Using in-memory storage; data is lost on restart");

    ServiceContextBuilder::new()
        .user_repo(Arc::new(MemoryUserRepository::new()))
        .leave_repo(Arc::new(MemoryLeaveRepository::new()))
        .session_store(Arc::new(MemorySessionStore::new(config.session.ttl_secs)))
        .refresh_token_store(Arc::new(MemoryRefreshTokenStore::new(
            refresh_ttl(config),
        )))
}

async fn postgres_backend(config: &AppConfig) -> Result<ServiceContextBuilder, AppError> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for postgres storage".into()))?;
    let redis_config = config
        .redis
        .as_ref()
        .ok_or_else(|| AppError::Config("REDIS_URL is required for postgres storage".into()))?;

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if db_config.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool ready");

    Ok(ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .leave_repo(Arc::new(PgLeaveRepository::new(pool.clone())))
        .session_store(Arc::new(RedisSessionStore::new(
            redis_pool.clone(),
            config.session.ttl_secs,
        )))
        .refresh_token_store(Arc::new(RedisRefreshTokenStore::new(
            redis_pool.clone(),
            refresh_ttl(config),
        )))
        .pg_pool(pool)
        .redis_pool(redis_pool))
}

/// Register the Google and GitHub clients whose credentials are configured.
fn with_identity_providers(
    mut builder: ServiceContextBuilder,
    config: &AppConfig,
) -> Result<ServiceContextBuilder, AppError> {
    let http = reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .build()
        .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;

    if let Some(google) = GoogleClient::from_config(http.clone(), &config.oauth) {
        info!("Google sign-in enabled");
        builder = builder.google(Arc::new(google));
    }
    if let Some(github) = GithubClient::from_config(http, &config.oauth) {
        info!("GitHub sign-in enabled");
        builder = builder.github(Arc::new(github));
    }
    Ok(builder)
}

fn refresh_ttl(config: &AppConfig) -> u64 {
    u64::try_from(config.jwt.refresh_token_expiry).unwrap_or(0)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);
    serve(listener, app).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}
