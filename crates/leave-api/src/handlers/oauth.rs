//! Social login handlers
//!
//! Successful logins set the session cookie exactly like password login.

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::CookieJar;
use leave_core::SocialProvider;
use leave_service::dto::{
    AuthResponse, AuthUrlResponse, GithubLoginRequest, GoogleLoginRequest, OAuthCallbackQuery,
};
use leave_service::{OAuthGrant, OAuthService, ServiceError};

use super::auth::with_session;
use crate::extractors::ValidatedJson;
use crate::response::ApiResult;
use crate::state::AppState;

/// Sign in with a Google ID token obtained client-side
///
/// POST /auth/google
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<GoogleLoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = OAuthService::new(state.service_context());
    let result = service
        .login(SocialProvider::Google, OAuthGrant::IdToken(request.id_token))
        .await?;
    Ok(with_session(&state, jar, result))
}

/// Google consent redirect target
///
/// GET /auth/google/callback
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    if let Some(error) = query.error {
        return Err(ServiceError::validation(format!("Google sign-in failed: {error}")).into());
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ServiceError::validation("Missing authorization code"))?;

    let service = OAuthService::new(state.service_context());
    let result = service
        .login(SocialProvider::Google, OAuthGrant::Code(code))
        .await?;
    Ok(with_session(&state, jar, result))
}

/// Sign in with a GitHub authorization code
///
/// POST /auth/github
pub async fn github_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<GithubLoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = OAuthService::new(state.service_context());
    let result = service
        .login(SocialProvider::Github, OAuthGrant::Code(request.code))
        .await?;
    Ok(with_session(&state, jar, result))
}

/// GET /auth/google/url
pub async fn google_auth_url(State(state): State<AppState>) -> ApiResult<Json<AuthUrlResponse>> {
    let service = OAuthService::new(state.service_context());
    Ok(Json(service.authorization_url(SocialProvider::Google)?))
}

/// GET /auth/github/url
pub async fn github_auth_url(State(state): State<AppState>) -> ApiResult<Json<AuthUrlResponse>> {
    let service = OAuthService::new(state.service_context());
    Ok(Json(service.authorization_url(SocialProvider::Github)?))
}
