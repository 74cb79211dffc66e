//! User administration handlers

use axum::{extract::State, Json};
use leave_service::dto::{UpdateRoleRequest, UserResponse};
use leave_service::UserService;

use crate::extractors::{CurrentActor, PathId, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Set a user's role (ADMIN only)
///
/// PATCH /users/{user_id}/role
pub async fn update_role(
    State(state): State<AppState>,
    current: CurrentActor,
    PathId(user_id): PathId,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.promote(&current.actor, user_id, request).await?;
    Ok(Json(response))
}
