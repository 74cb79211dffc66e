//! Authentication handlers
//!
//! Registration, login, logout, token refresh, the current user and password
//! changes. Login also sets the browser session cookie.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use leave_service::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, MessageResponse,
    RefreshTokenRequest, RegisterRequest, UserResponse,
};
use leave_service::{AuthService, LoginResult};

use crate::extractors::{CurrentActor, OptionalValidatedJson, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<AuthResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(Json(response)))
}

/// Login with email or username
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let result = service.login(request).await?;
    Ok(with_session(&state, jar, result))
}

/// Rotate a refresh token
///
/// POST /auth/token/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh_tokens(request).await?;
    Ok(Json(response))
}

/// Revoke the refresh token and end the session
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentActor,
    jar: CookieJar,
    OptionalValidatedJson(body): OptionalValidatedJson<LogoutRequest>,
) -> ApiResult<(CookieJar, NoContent)> {
    let refresh_token = body.and_then(|b| b.refresh_token);

    let service = AuthService::new(state.service_context());
    service
        .logout(
            &current.actor,
            refresh_token.as_deref(),
            current.session_id.as_deref(),
        )
        .await?;

    let jar = jar.remove(Cookie::build((state.session_cookie_name().to_owned(), "")).path("/"));
    Ok((jar, NoContent))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<Json<UserResponse>> {
    let service = AuthService::new(state.service_context());
    Ok(Json(service.me(&current.actor)?))
}

/// Change the current user's password
///
/// POST /auth/password
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentActor,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    service.change_password(&current.actor, request).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// Attach the login's session id as the session cookie.
pub(crate) fn with_session(
    state: &AppState,
    jar: CookieJar,
    result: LoginResult,
) -> (CookieJar, Json<AuthResponse>) {
    let cookie = Cookie::build((state.session_cookie_name().to_owned(), result.session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config().session.secure);

    (jar.add(cookie), Json(result.auth))
}
