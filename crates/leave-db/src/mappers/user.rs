use leave_core::{DomainError, Snowflake, User};

use crate::models::UserModel;

use super::corrupt_column;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role = model.role.parse().map_err(|e| corrupt_column("users", &e))?;
        let social_provider = model
            .social_provider
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e| corrupt_column("users", &e))?;

        Ok(User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role,
            is_superuser: model.is_superuser,
            is_verified: model.is_verified,
            is_active: model.is_active,
            social_id: model.social_id,
            social_provider,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
