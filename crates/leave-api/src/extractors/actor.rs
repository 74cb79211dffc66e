//! Acting principal extractor
//!
//! Runs the dual-mode identity resolution on every request: a bearer token
//! first, then the session cookie, otherwise anonymous. Never rejects a
//! request for bad credentials; handlers decide whether anonymous is enough.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use leave_core::Actor;
use leave_service::IdentityResolver;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct CurrentActor {
    pub actor: Actor,
    /// Session cookie value as sent, whether or not it resolved.
    pub session_id: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let session_id = CookieJar::from_headers(&parts.headers)
            .get(app_state.session_cookie_name())
            .map(|cookie| cookie.value().to_owned());

        let actor = IdentityResolver::new(app_state.service_context())
            .resolve(authorization.as_deref(), session_id.as_deref())
            .await?;

        Ok(Self { actor, session_id })
    }
}
