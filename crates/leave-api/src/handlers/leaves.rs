//! Leave handlers
//!
//! Every endpoint accepts anonymous callers at the transport level; the
//! service decides what an anonymous actor may see or do.

use axum::{extract::State, Json};
use leave_service::dto::{
    DecisionRequest, EditLeaveRequest, LeaveListResponse, LeaveResponse, LeaveStatsResponse,
    SubmitLeaveRequest,
};
use leave_service::LeaveService;

use crate::extractors::{CurrentActor, LeaveFilterQuery, PathId, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// List the records visible to the caller
///
/// GET /leaves
pub async fn list_leaves(
    State(state): State<AppState>,
    current: CurrentActor,
    LeaveFilterQuery(filter): LeaveFilterQuery,
) -> ApiResult<Json<LeaveListResponse>> {
    let service = LeaveService::new(state.service_context());
    let response = service.list_visible(&current.actor, filter).await?;
    Ok(Json(response))
}

/// POST /leaves
pub async fn submit_leave(
    State(state): State<AppState>,
    current: CurrentActor,
    ValidatedJson(request): ValidatedJson<SubmitLeaveRequest>,
) -> ApiResult<Created<Json<LeaveResponse>>> {
    let service = LeaveService::new(state.service_context());
    let response = service.submit(&current.actor, request).await?;
    Ok(Created(Json(response)))
}

/// Status counts over the caller's visible records
///
/// GET /leaves/stats
pub async fn leave_stats(
    State(state): State<AppState>,
    current: CurrentActor,
) -> ApiResult<Json<LeaveStatsResponse>> {
    let service = LeaveService::new(state.service_context());
    Ok(Json(service.stats(&current.actor).await?))
}

/// GET /leaves/{leave_id}
pub async fn get_leave(
    State(state): State<AppState>,
    current: CurrentActor,
    PathId(leave_id): PathId,
) -> ApiResult<Json<LeaveResponse>> {
    let service = LeaveService::new(state.service_context());
    Ok(Json(service.get(&current.actor, leave_id).await?))
}

/// Change type and dates of a PENDING record (owner only)
///
/// PATCH /leaves/{leave_id}
pub async fn edit_leave(
    State(state): State<AppState>,
    current: CurrentActor,
    PathId(leave_id): PathId,
    ValidatedJson(request): ValidatedJson<EditLeaveRequest>,
) -> ApiResult<Json<LeaveResponse>> {
    let service = LeaveService::new(state.service_context());
    let response = service.edit(&current.actor, leave_id, request).await?;
    Ok(Json(response))
}

/// POST /leaves/{leave_id}/cancel
pub async fn cancel_leave(
    State(state): State<AppState>,
    current: CurrentActor,
    PathId(leave_id): PathId,
) -> ApiResult<Json<LeaveResponse>> {
    let service = LeaveService::new(state.service_context());
    Ok(Json(service.cancel(&current.actor, leave_id).await?))
}

/// Approve or reject a PENDING record (MANAGER or ADMIN)
///
/// POST /leaves/{leave_id}/decision
pub async fn decide_leave(
    State(state): State<AppState>,
    current: CurrentActor,
    PathId(leave_id): PathId,
    ValidatedJson(request): ValidatedJson<DecisionRequest>,
) -> ApiResult<Json<LeaveResponse>> {
    let service = LeaveService::new(state.service_context());
    let response = service.decide(&current.actor, leave_id, request).await?;
    Ok(Json(response))
}
