//! Test helpers for integration tests
//!
//! Spawns the application on an ephemeral loopback port and wraps `reqwest`
//! with bearer/cookie authentication helpers.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use leave_api::{create_app, create_app_state};
use leave_common::{AppConfig, BootstrapAdminConfig};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const SESSION_COOKIE: &str = "sessionid";

/// How a request authenticates itself.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    Anonymous,
    Bearer(&'a str),
    Session(&'a str),
    Both { bearer: &'a str, session: &'a str },
}

impl Auth<'_> {
    fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        let cookie = |id: &str| format!("{SESSION_COOKIE}={id}");
        match self {
            Self::Anonymous => builder,
            Self::Bearer(token) => builder.bearer_auth(token),
            Self::Session(id) => builder.header(header::COOKIE, cookie(id)),
            Self::Both { bearer, session } => builder
                .bearer_auth(bearer)
                .header(header::COOKIE, cookie(session)),
        }
    }
}

/// A logged-in user: API tokens plus the browser session from the same login.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: UserResponse,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: String,
}

impl TestUser {
    pub fn bearer(&self) -> Auth<'_> {
        Auth::Bearer(&self.access_token)
    }

    pub fn session(&self) -> Auth<'_> {
        Auth::Session(&self.session_id)
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on the in-memory backend with a bootstrap admin.
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            leave_api::server::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url(), path);
        auth.apply(self.client.request(method, url))
    }

    pub async fn get(&self, path: &str, auth: Auth<'_>) -> Result<Response> {
        Ok(self.request(Method::GET, path, auth).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, auth: Auth<'_>, body: &T) -> Result<Response> {
        Ok(self.request(Method::POST, path, auth).json(body).send().await?)
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str, auth: Auth<'_>) -> Result<Response> {
        Ok(self.request(Method::POST, path, auth).send().await?)
    }

    pub async fn patch<T: Serialize>(&self, path: &str, auth: Auth<'_>, body: &T) -> Result<Response> {
        Ok(self.request(Method::PATCH, path, auth).json(body).send().await?)
    }

    /// Log in and capture both the tokens and the session cookie.
    pub async fn login(&self, login: &str, password: &str) -> Result<TestUser> {
        let request = LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        };
        let response = self.post("/api/v1/auth/login", Auth::Anonymous, &request).await?;
        let session_id = session_cookie(&response).context("login set no session cookie")?;
        let auth: AuthResponse = assert_json(response, StatusCode::OK).await?;

        Ok(TestUser {
            user: auth.user,
            password: password.to_string(),
            access_token: auth.tokens.access_token,
            refresh_token: auth.tokens.refresh_token,
            session_id,
        })
    }

    pub async fn admin(&self) -> Result<TestUser> {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a fresh EMPLOYEE and log them in.
    pub async fn employee(&self, prefix: &str) -> Result<TestUser> {
        let request = RegisterRequest::unique(prefix);
        let response = self
            .post("/api/v1/auth/register", Auth::Anonymous, &request)
            .await?;
        assert_status(response, StatusCode::CREATED).await?;
        self.login(&request.username, &request.password).await
    }

    /// Register a fresh user and have the admin promote them to MANAGER.
    pub async fn manager(&self, prefix: &str) -> Result<TestUser> {
        let user = self.employee(prefix).await?;
        let admin = self.admin().await?;

        let response = self
            .patch(
                &format!("/api/v1/users/{}/role", user.user.id),
                admin.bearer(),
                &serde_json::json!({ "role": "MANAGER" }),
            )
            .await?;
        assert_status(response, StatusCode::OK).await?;
        Ok(user)
    }
}

/// In-memory configuration with a seeded admin and a rate limit tests never hit.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::in_memory("integration-test-secret");
    config.bootstrap_admin = Some(BootstrapAdminConfig {
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    });
    config.rate_limit.requests_per_second = 1_000;
    config.rate_limit.burst = 10_000;
    config
}

/// Value of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            pair.strip_prefix(&prefix).map(str::to_string)
        })
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response's status and `error.code`.
pub async fn assert_error(response: Response, expected_status: StatusCode, code: &str) -> Result<()> {
    let body: crate::fixtures::ErrorBody = assert_json(response, expected_status).await?;
    anyhow::ensure!(
        body.error.code == code,
        "Expected error code {code}, got {} ({})",
        body.error.code,
        body.error.message
    );
    Ok(())
}
