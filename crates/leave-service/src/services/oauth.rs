//! Social login
//!
//! A verified external identity is linked to a local user in three steps:
//! an account already linked to (provider, social_id) wins, then an account
//! with the same email gets linked, and otherwise a new verified EMPLOYEE is
//! created from the provider's display name.

use leave_core::{SocialProvider, User};
use tracing::{info, instrument, warn};

use crate::dto::AuthUrlResponse;
use crate::providers::{ExternalIdentity, IdentityProvider, OAuthGrant};

use super::auth::{AuthService, LoginResult};
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct OAuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> OAuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn authorization_url(&self, provider: SocialProvider) -> ServiceResult<AuthUrlResponse> {
        let auth_url = self.client(provider)?.authorization_url()?;
        Ok(AuthUrlResponse { auth_url })
    }

    /// Verify the grant with the provider, then log the linked user in.
    #[instrument(skip(self, grant), fields(provider = %provider))]
    pub async fn login(
        &self,
        provider: SocialProvider,
        grant: OAuthGrant,
    ) -> ServiceResult<LoginResult> {
        let identity = self.client(provider)?.authenticate(grant).await?;
        let user = self.link_or_create(identity).await?;

        if !user.is_active {
            warn!(user_id = %user.id, "Social login refused: account inactive");
            return Err(leave_common::AppError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "Social login succeeded");
        AuthService::new(self.ctx).start_session(&user).await
    }

    fn client(&self, provider: SocialProvider) -> ServiceResult<&dyn IdentityProvider> {
        self.ctx.identity_provider(provider).ok_or_else(|| {
            ServiceError::validation(format!("{provider} sign-in is not configured"))
        })
    }

    async fn link_or_create(&self, identity: ExternalIdentity) -> ServiceResult<User> {
        let repo = self.ctx.user_repo();

        if let Some(user) = repo
            .find_by_social(identity.provider, &identity.social_id)
            .await?
        {
            return Ok(user);
        }

        if let Some(mut user) = repo.find_by_email(&identity.email).await? {
            user.link_social(identity.provider, identity.social_id);
            repo.update(&user).await?;
            info!(user_id = %user.id, provider = %identity.provider, "Linked social account");
            return Ok(user);
        }

        let user = User::from_social(
            self.ctx.generate_id(),
            &identity.display_name,
            identity.email,
            identity.provider,
            identity.social_id,
        );
        if user.username.is_empty() {
            return Err(ServiceError::validation(
                "Provider returned no usable display name",
            ));
        }
        if repo.username_exists(&user.username).await? {
            warn!(username = %user.username, "Social signup blocked by username collision");
            return Err(ServiceError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        repo.create(&user, None).await?;
        info!(user_id = %user.id, provider = %identity.provider, "Created user from social login");
        Ok(user)
    }
}
