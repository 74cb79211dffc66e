//! User administration

use leave_core::{Actor, DomainError, Role, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{UpdateRoleRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set another user's stored role. ADMIN only.
    #[instrument(skip(self, actor), fields(target = %user_id, role = %request.role))]
    pub async fn promote(
        &self,
        actor: &Actor,
        user_id: Snowflake,
        request: UpdateRoleRequest,
    ) -> ServiceResult<UserResponse> {
        if !actor.is_authenticated() {
            return Err(ServiceError::Unauthorized);
        }
        if !actor.is_admin() {
            warn!(actor = ?actor.handle(), "Role change refused: not an admin");
            return Err(DomainError::InsufficientRole {
                required: Role::Admin,
            }
            .into());
        }

        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        user.set_role(request.role);
        self.ctx.user_repo().update(&user).await?;

        info!(username = %user.username, "User role updated");
        Ok(UserResponse::from(&user))
    }
}
