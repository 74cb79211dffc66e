//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::NaiveDate;
use leave_core::{LeaveStatus, LeaveType, Role, USERNAME_MAX_LEN};
use serde::Deserialize;
use validator::{Validate, ValidationError};

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 50, message = "Username must be 1-50 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub password_confirm: String,

    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Letters, digits and `@ . + - _`.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username.chars().count() <= USERNAME_MAX_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_' | ' '));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Username may contain only letters, digits, spaces and @/./+/-/_".into()))
    }
}

/// `login` accepts an email address or a username.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub login: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// ============================================================================
// OAuth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GithubLoginRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// Query string of the provider's redirect back to us.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

// ============================================================================
// Leave Requests
// ============================================================================

/// `employee_name` may be omitted by non-privileged users; their own handle is used.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitLeaveRequest {
    #[validate(length(max = 50, message = "Employee name must be at most 50 characters"))]
    #[serde(default)]
    pub employee_name: Option<String>,

    pub leave_type: LeaveType,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,
}

/// All three fields are required; they are optional here so a missing one is
/// reported after the ownership and state checks.
#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct EditLeaveRequest {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DecisionRequest {
    pub status: LeaveStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: "ada@example.com".to_string(),
            password: "long-enough".to_string(),
            password_confirm: "long-enough".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_register_username_rules() {
        assert!(register("ada.lovelace+1").validate().is_ok());
        assert!(register("").validate().is_err());
        assert!(register("ada<script>").validate().is_err());
        assert!(register(&"a".repeat(51)).validate().is_err());
    }

    #[test]
    fn test_login_accepts_email_or_username_keys() {
        let by_email: LoginRequest =
            serde_json::from_str(r#"{"email": "ada@example.com", "password": "x"}"#).unwrap();
        let by_username: LoginRequest =
            serde_json::from_str(r#"{"username": "ada", "password": "x"}"#).unwrap();
        assert_eq!(by_email.login, "ada@example.com");
        assert_eq!(by_username.login, "ada");
    }

    #[test]
    fn test_submit_request_parses_enums_and_dates() {
        let request: SubmitLeaveRequest = serde_json::from_str(
            r#"{"leave_type": "SICK", "start_date": "2024-01-15", "end_date": "2024-01-16"}"#,
        )
        .unwrap();
        assert_eq!(request.leave_type, LeaveType::Sick);
        assert!(request.employee_name.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_submit_request_rejects_unknown_leave_type() {
        let result: Result<SubmitLeaveRequest, _> = serde_json::from_str(
            r#"{"leave_type": "SABBATICAL", "start_date": "2024-01-15", "end_date": "2024-01-16"}"#,
        );
        assert!(result.is_err());
    }
}
