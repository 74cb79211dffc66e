//! Identity provider clients
//!
//! Each provider turns an authorization artifact (an ID token or an OAuth
//! authorization code) into a verified external identity. The linking of that
//! identity to a local user happens in `OAuthService`.

mod github;
mod google;

use async_trait::async_trait;
use leave_core::SocialProvider;

use crate::services::ServiceResult;

pub use github::GithubClient;
pub use google::GoogleClient;

/// What the client presents to prove an external identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthGrant {
    /// A signed ID token obtained client-side (Google only).
    IdToken(String),
    /// An authorization code from the provider's consent redirect.
    Code(String),
}

/// A verified identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: SocialProvider,
    /// Stable subject id at the provider.
    pub social_id: String,
    pub email: String,
    /// Display name or login, used as the username for new accounts.
    pub display_name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> SocialProvider;

    /// Consent page URL for the configured client id and redirect URI.
    fn authorization_url(&self) -> ServiceResult<String>;

    async fn authenticate(&self, grant: OAuthGrant) -> ServiceResult<ExternalIdentity>;
}

/// Provider unreachable or answered with something unparseable.
pub(crate) fn upstream_error(provider: SocialProvider, err: reqwest::Error) -> crate::ServiceError {
    tracing::error!(provider = %provider, error = %err, "Identity provider request failed");
    leave_common::AppError::ExternalService(format!("{provider}: {err}")).into()
}
