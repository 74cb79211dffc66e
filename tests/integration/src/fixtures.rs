//! Test fixtures and data generators
//!
//! Request bodies and the subset of each response the tests read.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Letters-only unique suffix, so generated usernames are also valid employee names.
pub fn unique_suffix() -> String {
    let mut n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut suffix = String::new();
    loop {
        suffix.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
        if n == 0 {
            break;
        }
    }
    suffix
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterRequest {
    pub fn unique(prefix: &str) -> Self {
        let username = format!("{prefix}{}", unique_suffix());
        Self {
            email: format!("{}@example.com", username.to_lowercase()),
            username,
            password: "TestPass123!".to_string(),
            password_confirm: "TestPass123!".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: Tokens,
}

#[derive(Debug, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub effective_role: String,
    pub is_superuser: bool,
}

// ============================================================================
// Leaves
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubmitLeave {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SubmitLeave {
    /// A sick-leave request for the caller's own name.
    pub fn sick(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            employee_name: None,
            leave_type: "SICK".to_string(),
            start_date: start,
            end_date: end,
        }
    }

    pub fn for_employee(mut self, name: &str) -> Self {
        self.employee_name = Some(name.to_string());
        self
    }

    pub fn of_type(mut self, leave_type: &str) -> Self {
        self.leave_type = leave_type.to_string();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveResponse {
    pub id: String,
    pub employee_name: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub status: String,
    pub cancelled_by: Option<String>,
    pub is_editable: bool,
    pub is_cancellable: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeaveList {
    pub count: usize,
    pub results: Vec<LeaveResponse>,
}

impl LeaveList {
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.id.as_str()).collect()
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct LeaveStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub cancelled: u64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
