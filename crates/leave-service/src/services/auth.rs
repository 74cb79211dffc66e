//! Authentication service
//!
//! Handles registration, login, token refresh, logout and password changes.
//! Refresh tokens are tracked by their `jti` so a rotated or revoked token is
//! unusable even though its signature is still valid.

use leave_cache::RefreshTokenData;
use leave_common::{
    hash_password, validate_password_strength, verify_password, AppError, BootstrapAdminConfig,
    TokenPair,
};
use leave_core::{Actor, DomainError, User};
use tracing::{info, instrument, warn};

use crate::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A login's tokens plus the browser session opened alongside them.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub auth: AuthResponse,
    pub session_id: String,
}

pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new EMPLOYEE account
    #[instrument(skip(self, request), fields(username = %request.username, email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        if request.password != request.password_confirm {
            return Err(ServiceError::validation("Passwords do not match"));
        }
        validate_password_strength(&request.password)?;

        if self.ctx.user_repo().email_exists(&request.email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        if self.ctx.user_repo().username_exists(&request.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;

        let mut user = User::new(self.ctx.generate_id(), request.username, request.email);
        user.first_name = request.first_name.unwrap_or_default();
        user.last_name = request.last_name.unwrap_or_default();

        self.ctx.user_repo().create(&user, Some(&password_hash)).await?;
        info!(user_id = %user.id, "User registered successfully");

        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthResponse::new(UserResponse::from(&user), tokens))
    }

    /// Login with email or username. Also opens a web session.
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResult> {
        let user = self
            .ctx
            .user_repo()
            .find_by_login(&request.login)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: account inactive");
            return Err(AppError::InvalidCredentials.into());
        }

        // Social-only accounts have no local password
        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(AppError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in successfully");
        self.start_session(&user).await
    }

    /// Exchange a live refresh token for a new pair; the old one is revoked.
    #[instrument(skip(self, request))]
    pub async fn refresh_tokens(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;

        let stored = self
            .ctx
            .refresh_token_store()
            .validate(&claims.jti)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(stored.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        // Deleting the stored token is the claim: of two concurrent refreshes
        // with the same token only one sees the delete succeed.
        if !self.ctx.refresh_token_store().revoke(&claims.jti).await? {
            warn!(user_id = %user.id, "Refresh token already used");
            return Err(AppError::InvalidToken.into());
        }
        let tokens = self.issue_tokens(&user).await?;

        info!(user_id = %user.id, "Tokens refreshed successfully");
        Ok(AuthResponse::new(UserResponse::from(&user), tokens))
    }

    /// Revoke the given refresh token and end the browser session.
    #[instrument(skip(self, actor, refresh_token, session_id))]
    pub async fn logout(
        &self,
        actor: &Actor,
        refresh_token: Option<&str>,
        session_id: Option<&str>,
    ) -> ServiceResult<()> {
        let user = actor.user().ok_or(ServiceError::Unauthorized)?;

        if let Some(token) = refresh_token {
            match self.ctx.jwt_service().validate_refresh_token(token) {
                Ok(claims) if claims.user_id().ok() == Some(user.id) => {
                    self.ctx.refresh_token_store().revoke(&claims.jti).await?;
                }
                // Someone else's or already dead: nothing to revoke
                _ => warn!(user_id = %user.id, "Logout with unusable refresh token"),
            }
        }

        if let Some(session_id) = session_id {
            self.ctx.session_store().destroy(session_id).await?;
        }

        info!(user_id = %user.id, "User logged out successfully");
        Ok(())
    }

    pub fn me(&self, actor: &Actor) -> ServiceResult<UserResponse> {
        actor
            .user()
            .map(UserResponse::from)
            .ok_or(ServiceError::Unauthorized)
    }

    /// Change the actor's password. Every refresh token they hold is revoked.
    #[instrument(skip(self, actor, request))]
    pub async fn change_password(
        &self,
        actor: &Actor,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        let user = actor.user().ok_or(ServiceError::Unauthorized)?;

        let current_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| ServiceError::validation("Account has no password to change"))?;

        if !verify_password(&request.old_password, &current_hash)? {
            warn!(user_id = %user.id, "Password change refused: wrong old password");
            return Err(ServiceError::validation("Old password is incorrect"));
        }
        if request.new_password == request.old_password {
            return Err(ServiceError::validation(
                "New password must differ from the old password",
            ));
        }
        validate_password_strength(&request.new_password)?;

        let new_hash = hash_password(&request.new_password)?;
        self.ctx.user_repo().update_password(user.id, &new_hash).await?;
        let revoked = self
            .ctx
            .refresh_token_store()
            .revoke_all_for_user(user.id)
            .await?;

        info!(user_id = %user.id, revoked, "Password changed");
        Ok(())
    }

    /// Create the configured superuser unless an account with that email exists.
    /// Returns whether one was created.
    #[instrument(skip(self, config), fields(email = %config.email))]
    pub async fn bootstrap_admin(&self, config: &BootstrapAdminConfig) -> ServiceResult<bool> {
        if self.ctx.user_repo().email_exists(&config.email).await? {
            info!("Bootstrap admin already present");
            return Ok(false);
        }

        let password_hash = hash_password(&config.password)?;
        let admin = User::superuser(
            self.ctx.generate_id(),
            config.username.clone(),
            config.email.clone(),
        );
        self.ctx.user_repo().create(&admin, Some(&password_hash)).await?;

        info!(user_id = %admin.id, "Bootstrap admin created");
        Ok(true)
    }

    /// Issue a token pair and a web session for an authenticated user.
    pub(crate) async fn start_session(&self, user: &User) -> ServiceResult<LoginResult> {
        let tokens = self.issue_tokens(user).await?;
        let session = self.ctx.session_store().create(user.id).await?;

        Ok(LoginResult {
            auth: AuthResponse::new(UserResponse::from(user), tokens),
            session_id: session.session_id,
        })
    }

    async fn issue_tokens(&self, user: &User) -> ServiceResult<TokenPair> {
        let tokens = self.ctx.jwt_service().generate_token_pair(user.id)?;
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&tokens.refresh_token)?;

        self.ctx
            .refresh_token_store()
            .store(&claims.jti, &RefreshTokenData::new(user.id))
            .await?;
        Ok(tokens)
    }
}
