//! Leave lifecycle service
//!
//! Submission, edits, cancellation, review decisions and role-scoped reads.
//! Every state change is written with `update_if_status`, so when two requests
//! race on the same record exactly one transition is stored and the other
//! reports the state it lost to.

use chrono::Utc;
use leave_core::{
    validate_employee_name, Actor, DomainError, LeaveFilter, LeaveQuery, LeaveRecord, LeaveStatus,
    Role, Snowflake, Visibility,
};
use tracing::{info, instrument, warn};

use crate::dto::{
    DecisionRequest, EditLeaveRequest, LeaveListResponse, LeaveResponse, LeaveStatsResponse,
    SubmitLeaveRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct LeaveService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LeaveService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a PENDING record.
    ///
    /// Non-privileged users always file for themselves: a supplied name is
    /// validated and then replaced by their handle.
    #[instrument(skip(self, actor, request), fields(actor = ?actor.handle()))]
    pub async fn submit(
        &self,
        actor: &Actor,
        request: SubmitLeaveRequest,
    ) -> ServiceResult<LeaveResponse> {
        if !actor.is_authenticated() && !self.ctx.config().leave.allow_anonymous_submit {
            return Err(ServiceError::Unauthorized);
        }

        let supplied = request
            .employee_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = supplied {
            validate_employee_name(name)?;
        }

        let employee_name = match actor.handle() {
            Some(handle) if !actor.is_privileged() => handle.to_string(),
            _ => supplied
                .map(str::to_string)
                .ok_or_else(|| ServiceError::validation("employee_name is required"))?,
        };

        let record = LeaveRecord::new(
            self.ctx.generate_id(),
            employee_name,
            request.leave_type,
            request.start_date,
            request.end_date,
        )?;
        self.ctx.leave_repo().create(&record).await?;

        info!(
            leave_id = %record.id,
            employee = %record.employee_name,
            leave_type = %record.leave_type,
            "Leave submitted"
        );

        Ok(LeaveResponse::from(record))
    }

    /// Change type and dates of the actor's own PENDING record.
    #[instrument(skip(self, actor, request), fields(actor = ?actor.handle()))]
    pub async fn edit(
        &self,
        actor: &Actor,
        leave_id: Snowflake,
        request: EditLeaveRequest,
    ) -> ServiceResult<LeaveResponse> {
        let mut record = self.owned_record(actor, leave_id).await?;

        if !record.is_editable() {
            return Err(DomainError::LeaveNotEditable(record.status).into());
        }

        let (Some(leave_type), Some(start_date), Some(end_date)) =
            (request.leave_type, request.start_date, request.end_date)
        else {
            return Err(ServiceError::validation(
                "leave_type, start_date and end_date are all required",
            ));
        };

        record.edit(leave_type, start_date, end_date)?;
        self.write_transition(&record, &[LeaveStatus::Pending], DomainError::LeaveNotEditable)
            .await?;

        info!(leave_id = %leave_id, "Leave edited");
        Ok(LeaveResponse::from(record))
    }

    /// Cancel the actor's own PENDING or APPROVED record.
    #[instrument(skip(self, actor), fields(actor = ?actor.handle()))]
    pub async fn cancel(&self, actor: &Actor, leave_id: Snowflake) -> ServiceResult<LeaveResponse> {
        let mut record = self.owned_record(actor, leave_id).await?;
        let previous = record.status;

        let handle = actor.handle().ok_or(ServiceError::Unauthorized)?;
        record.cancel(handle, Utc::now())?;
        self.write_transition(&record, &LeaveStatus::CANCELLABLE, DomainError::LeaveNotCancellable)
            .await?;

        info!(leave_id = %leave_id, from = %previous, by = %handle, "Leave cancelled");
        Ok(LeaveResponse::from(record))
    }

    /// Approve or reject a PENDING record. MANAGER or ADMIN only.
    #[instrument(skip(self, actor, request), fields(actor = ?actor.handle(), decision = %request.status))]
    pub async fn decide(
        &self,
        actor: &Actor,
        leave_id: Snowflake,
        request: DecisionRequest,
    ) -> ServiceResult<LeaveResponse> {
        if !actor.is_authenticated() {
            return Err(ServiceError::Unauthorized);
        }
        if !actor.is_privileged() {
            warn!(leave_id = %leave_id, "Decision refused: reviewer role required");
            return Err(DomainError::InsufficientRole {
                required: Role::Manager,
            }
            .into());
        }

        let mut record = self.find(leave_id).await?;
        record.decide(request.status)?;
        self.write_transition(&record, &[LeaveStatus::Pending], DomainError::LeaveAlreadyDecided)
            .await?;

        info!(leave_id = %leave_id, status = %record.status, "Leave decided");
        Ok(LeaveResponse::from(record))
    }

    /// A single record, if the actor may see it. Hidden records are reported
    /// as missing.
    #[instrument(skip(self, actor), fields(actor = ?actor.handle()))]
    pub async fn get(&self, actor: &Actor, leave_id: Snowflake) -> ServiceResult<LeaveResponse> {
        let record = self.find(leave_id).await?;
        if !Visibility::for_actor(actor).admits(&record) {
            return Err(DomainError::LeaveNotFound(leave_id).into());
        }
        Ok(LeaveResponse::from(record))
    }

    /// Records visible to the actor that match `filter`, in the filter's order.
    #[instrument(skip(self, actor, filter), fields(actor = ?actor.handle()))]
    pub async fn list_visible(
        &self,
        actor: &Actor,
        filter: LeaveFilter,
    ) -> ServiceResult<LeaveListResponse> {
        let query = LeaveQuery::for_actor(actor, filter);
        if query.visibility == Visibility::Nothing {
            return Ok(LeaveListResponse::new(Vec::new()));
        }

        let records = self.ctx.leave_repo().find(&query).await?;
        Ok(LeaveListResponse::new(
            records.iter().map(LeaveResponse::from).collect(),
        ))
    }

    /// Per-status counts over the actor's visible set.
    #[instrument(skip(self, actor), fields(actor = ?actor.handle()))]
    pub async fn stats(&self, actor: &Actor) -> ServiceResult<LeaveStatsResponse> {
        let visibility = Visibility::for_actor(actor);
        if visibility == Visibility::Nothing {
            return Ok(LeaveStatsResponse::default());
        }

        let counts = self.ctx.leave_repo().count_by_status(&visibility).await?;
        Ok(LeaveStatsResponse::from(counts))
    }

    async fn find(&self, leave_id: Snowflake) -> ServiceResult<LeaveRecord> {
        self.ctx
            .leave_repo()
            .find_by_id(leave_id)
            .await?
            .ok_or_else(|| DomainError::LeaveNotFound(leave_id).into())
    }

    /// Load a record for an owner-only operation. No role bypasses ownership.
    async fn owned_record(&self, actor: &Actor, leave_id: Snowflake) -> ServiceResult<LeaveRecord> {
        if !actor.is_authenticated() {
            return Err(ServiceError::Unauthorized);
        }

        let record = self.find(leave_id).await?;
        if !actor.owns(&record.employee_name) {
            warn!(leave_id = %leave_id, owner = %record.employee_name, "Refused: not the owner");
            return Err(DomainError::NotLeaveOwner.into());
        }
        Ok(record)
    }

    /// Persist `record` only if the stored status is still one of `expected`.
    /// When another request got there first, report the status it left behind.
    async fn write_transition(
        &self,
        record: &LeaveRecord,
        expected: &[LeaveStatus],
        stale: fn(LeaveStatus) -> DomainError,
    ) -> ServiceResult<()> {
        if self.ctx.leave_repo().update_if_status(record, expected).await? {
            return Ok(());
        }

        let current = self.find(record.id).await?;
        warn!(leave_id = %record.id, status = %current.status, "Lost a concurrent status change");
        Err(stale(current.status).into())
    }
}
