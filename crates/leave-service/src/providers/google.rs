//! Google sign-in: ID token verification and authorization-code exchange.

use async_trait::async_trait;
use leave_common::OAuthConfig;
use leave_core::SocialProvider;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{upstream_error, ExternalIdentity, IdentityProvider, OAuthGrant};
use crate::services::{ServiceError, ServiceResult};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_INFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: Client,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

/// Claims returned by the tokeninfo endpoint.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenExchange {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleClient {
    pub fn new(
        http: Client,
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// `None` unless a client id is configured.
    pub fn from_config(http: Client, config: &OAuthConfig) -> Option<Self> {
        let client_id = config.google_client_id.clone()?;
        Some(Self::new(
            http,
            client_id,
            config.google_client_secret.clone(),
            config.google_redirect_uri.clone(),
        ))
    }

    async fn verify_id_token(&self, id_token: &str) -> ServiceResult<ExternalIdentity> {
        let response = self
            .http
            .get(TOKEN_INFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Google rejected ID token");
            return Err(ServiceError::validation("Invalid Google ID token"));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?;

        if info.aud != self.client_id {
            warn!("Google ID token issued for another client");
            return Err(ServiceError::validation("Invalid Google ID token"));
        }

        identity(info.sub, info.email, info.name)
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<ExternalIdentity> {
        let secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Google code exchange is not configured"))?;

        let exchange: TokenExchange = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", secret),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?
            .json()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?;

        let access_token = exchange
            .access_token
            .ok_or_else(|| ServiceError::validation("Failed to exchange code for token"))?;

        let info: UserInfo = self
            .http
            .get(USER_INFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?
            .json()
            .await
            .map_err(|e| upstream_error(SocialProvider::Google, e))?;

        identity(info.id, info.email, info.name)
    }
}

fn identity(
    social_id: String,
    email: Option<String>,
    name: Option<String>,
) -> ServiceResult<ExternalIdentity> {
    let email = email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServiceError::validation("Google account has no email address"))?;
    let display_name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(ExternalIdentity {
        provider: SocialProvider::Google,
        social_id,
        email,
        display_name,
    })
}

#[async_trait]
impl IdentityProvider for GoogleClient {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Google
    }

    fn authorization_url(&self) -> ServiceResult<String> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| ServiceError::internal(e.to_string()))?;
        Ok(url.into())
    }

    #[instrument(skip(self, grant))]
    async fn authenticate(&self, grant: OAuthGrant) -> ServiceResult<ExternalIdentity> {
        match grant {
            OAuthGrant::IdToken(token) => self.verify_id_token(&token).await,
            OAuthGrant::Code(code) => self.exchange_code(&code).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(
            Client::new(),
            "client-123.apps.googleusercontent.com",
            Some("secret".to_string()),
            "http://localhost:8000/api/v1/auth/google/callback",
        )
    }

    #[test]
    fn test_authorization_url() {
        let url = Url::parse(&client().authorization_url().unwrap()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:8000/api/v1/auth/google/callback"
        );
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["response_type"], "code");
    }

    #[test]
    fn test_from_config_requires_client_id() {
        let config = OAuthConfig::default();
        assert!(GoogleClient::from_config(Client::new(), &config).is_none());
    }

    #[test]
    fn test_identity_falls_back_to_email_local_part() {
        let identity = identity("42".to_string(), Some("ada@example.com".to_string()), None).unwrap();
        assert_eq!(identity.display_name, "ada");
        assert_eq!(identity.provider, SocialProvider::Google);
    }

    #[test]
    fn test_identity_requires_email() {
        assert!(identity("42".to_string(), None, Some("Ada".to_string())).is_err());
    }
}
