//! Request identity resolution
//!
//! Bearer token first, then the session cookie, then anonymous. Token failures
//! of any kind only mean "no bearer identity"; they never fail the request.

use leave_common::bearer_token;
use leave_core::{Actor, Snowflake, User};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct IdentityResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the acting principal from the raw `Authorization` header value
    /// and the session cookie value, whichever are present.
    ///
    /// Only storage failures are errors.
    #[instrument(skip_all, fields(has_bearer = authorization.is_some(), has_session = session_id.is_some()))]
    pub async fn resolve(
        &self,
        authorization: Option<&str>,
        session_id: Option<&str>,
    ) -> ServiceResult<Actor> {
        if let Some(user) = self.from_bearer(authorization).await? {
            return Ok(Actor::User(user));
        }
        if let Some(user) = self.from_session(session_id).await? {
            return Ok(Actor::User(user));
        }
        Ok(Actor::Anonymous)
    }

    async fn from_bearer(&self, authorization: Option<&str>) -> ServiceResult<Option<User>> {
        let Some(token) = authorization.and_then(bearer_token) else {
            return Ok(None);
        };

        let user_id = match self
            .ctx
            .jwt_service()
            .validate_access_token(token)
            .and_then(|claims| claims.user_id())
        {
            Ok(user_id) => user_id,
            Err(e) => {
                debug!(error = %e, "Ignoring unusable bearer token");
                return Ok(None);
            }
        };

        self.active_user(user_id).await
    }

    async fn from_session(&self, session_id: Option<&str>) -> ServiceResult<Option<User>> {
        let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        match self.ctx.session_store().get(session_id).await? {
            Some(session) => self.active_user(session.user_id).await,
            None => {
                debug!("Session cookie does not name a live session");
                Ok(None)
            }
        }
    }

    /// Deactivated or deleted users resolve to nobody.
    async fn active_user(&self, user_id: Snowflake) -> ServiceResult<Option<User>> {
        let user = self.ctx.user_repo().find_by_id(user_id).await?;
        if user.as_ref().is_some_and(|u| !u.is_active) {
            debug!(user_id = %user_id, "Credential belongs to an inactive user");
            return Ok(None);
        }
        Ok(user)
    }
}
