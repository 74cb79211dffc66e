//! GitHub sign-in through the OAuth web flow.

use async_trait::async_trait;
use leave_common::OAuthConfig;
use leave_core::SocialProvider;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{upstream_error, ExternalIdentity, IdentityProvider, OAuthGrant};
use crate::services::{ServiceError, ServiceResult};

const AUTH_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";

/// GitHub's API refuses requests without a user agent.
const CLIENT_USER_AGENT: &str = "leave-server";

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenExchange {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

impl GithubClient {
    pub fn new(
        http: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// `None` unless both client id and secret are configured.
    pub fn from_config(http: Client, config: &OAuthConfig) -> Option<Self> {
        Some(Self::new(
            http,
            config.github_client_id.clone()?,
            config.github_client_secret.clone()?,
            config.github_redirect_uri.clone(),
        ))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> ServiceResult<T> {
        self.http
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|e| upstream_error(SocialProvider::Github, e))?
            .json()
            .await
            .map_err(|e| upstream_error(SocialProvider::Github, e))
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<ExternalIdentity> {
        let exchange: TokenExchange = self
            .http
            .post(TOKEN_URL)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| upstream_error(SocialProvider::Github, e))?
            .json()
            .await
            .map_err(|e| upstream_error(SocialProvider::Github, e))?;

        let access_token = exchange.access_token.ok_or_else(|| {
            warn!("GitHub code exchange returned no access token");
            ServiceError::validation("Failed to get access token from GitHub")
        })?;

        let user: GithubUser = self.get_json(USER_URL, &access_token).await?;
        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                let emails: Vec<GithubEmail> = self.get_json(EMAILS_URL, &access_token).await?;
                pick_email(&emails, &user.login)
            }
        };

        Ok(ExternalIdentity {
            provider: SocialProvider::Github,
            social_id: user.id.to_string(),
            email,
            display_name: user.login,
        })
    }
}

/// Primary address, else the first listed, else a placeholder under the login.
fn pick_email(emails: &[GithubEmail], login: &str) -> String {
    emails
        .iter()
        .find(|e| e.primary)
        .or_else(|| emails.first())
        .map_or_else(|| format!("{login}@github.local"), |e| e.email.clone())
}

#[async_trait]
impl IdentityProvider for GithubClient {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Github
    }

    fn authorization_url(&self) -> ServiceResult<String> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", "read:user user:email"),
            ],
        )
        .map_err(|e| ServiceError::internal(e.to_string()))?;
        Ok(url.into())
    }

    #[instrument(skip(self, grant))]
    async fn authenticate(&self, grant: OAuthGrant) -> ServiceResult<ExternalIdentity> {
        match grant {
            OAuthGrant::Code(code) => self.exchange_code(&code).await,
            OAuthGrant::IdToken(_) => Err(ServiceError::validation(
                "GitHub sign-in requires an authorization code",
            )),
        }
    }
}
