//! User entity - an account that can authenticate and own leave records

use chrono::{DateTime, Utc};

use crate::value_objects::{Role, Snowflake, SocialProvider};

pub const USERNAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub is_active: bool,
    pub social_id: Option<String>,
    pub social_provider: Option<SocialProvider>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Locally registered account: EMPLOYEE, active, not yet verified.
    pub fn new(id: Snowflake, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Employee,
            is_superuser: false,
            is_verified: false,
            is_active: true,
            social_id: None,
            social_provider: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Account created on first social login. The provider vouches for the email.
    pub fn from_social(
        id: Snowflake,
        username: &str,
        email: String,
        provider: SocialProvider,
        social_id: String,
    ) -> Self {
        let mut user = Self::new(id, truncate_username(username), email);
        user.is_verified = true;
        user.social_provider = Some(provider);
        user.social_id = Some(social_id);
        user
    }

    /// Superuser with the ADMIN role, used for bootstrapping.
    pub fn superuser(id: Snowflake, username: String, email: String) -> Self {
        let mut user = Self::new(id, username, email);
        user.role = Role::Admin;
        user.is_superuser = true;
        user.is_verified = true;
        user
    }

    /// Identifying handle matched against `LeaveRecord::employee_name`.
    #[inline]
    pub fn handle(&self) -> &str {
        &self.username
    }

    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let trimmed = full.trim();
        if trimmed.is_empty() {
            self.username.clone()
        } else {
            trimmed.to_string()
        }
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn link_social(&mut self, provider: SocialProvider, social_id: String) {
        self.social_provider = Some(provider);
        self.social_id = Some(social_id);
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn is_linked_to(&self, provider: SocialProvider, social_id: &str) -> bool {
        self.social_provider == Some(provider) && self.social_id.as_deref() == Some(social_id)
    }
}

/// Cut a provider-supplied display name down to the username column width,
/// respecting char boundaries.
pub fn truncate_username(raw: &str) -> String {
    raw.trim().chars().take(USERNAME_MAX_LEN).collect()
}
