//! Response DTOs for API endpoints
//!
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, NaiveDate, Utc};
use leave_common::TokenPair;
use leave_core::{LeaveStatus, LeaveType, Role, SocialProvider};
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored role.
    pub role: Role,
    /// Role used for access checks; ADMIN for superusers.
    pub effective_role: Role,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_provider: Option<SocialProvider>,
    pub created_at: DateTime<Utc>,
}

/// Authentication response with tokens
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

impl AuthResponse {
    pub fn new(user: UserResponse, tokens: TokenPair) -> Self {
        Self { user, tokens }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Leave Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResponse {
    pub id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub leave_type_display: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub status: LeaveStatus,
    pub applied_on: DateTime<Utc>,
    pub cancelled_by: Option<String>,
    pub cancelled_on: Option<DateTime<Utc>>,
    pub is_editable: bool,
    pub is_cancellable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveListResponse {
    pub count: usize,
    pub results: Vec<LeaveResponse>,
}

impl LeaveListResponse {
    pub fn new(results: Vec<LeaveResponse>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveStatsResponse {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub cancelled: u64,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health of each backing service. `None` means not used by this backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: Option<String>,
    pub cache: Option<String>,
}

impl ReadinessResponse {
    pub fn from_checks(database: Option<bool>, cache: Option<bool>) -> Self {
        let label = |healthy: bool| if healthy { "healthy" } else { "unhealthy" }.to_string();
        let ready = database.unwrap_or(true) && cache.unwrap_or(true);
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: database.map(label),
                cache: cache.map(label),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
