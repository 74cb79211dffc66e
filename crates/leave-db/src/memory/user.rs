use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use leave_core::{DomainError, RepoResult, Snowflake, SocialProvider, User, UserRepository};

struct StoredUser {
    user: User,
    password_hash: Option<String>,
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Snowflake, StoredUser>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_first<P>(&self, predicate: P) -> Option<User>
    where
        P: Fn(&User) -> bool,
    {
        self.users
            .read()
            .values()
            .map(|stored| &stored.user)
            .find(|user| predicate(user))
            .cloned()
    }

    /// First uniqueness rule `candidate` would break against `existing`.
    fn conflict(existing: &User, candidate: &User) -> Option<DomainError> {
        if existing.email.eq_ignore_ascii_case(&candidate.email) {
            return Some(DomainError::EmailAlreadyExists);
        }
        if existing.username.to_lowercase() == candidate.username.to_lowercase() {
            return Some(DomainError::UsernameAlreadyExists);
        }
        match (candidate.social_provider, candidate.social_id.as_deref()) {
            (Some(provider), Some(social_id)) if existing.is_linked_to(provider, social_id) => {
                Some(DomainError::SocialAccountAlreadyLinked)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.find_first(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn find_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        if let Some(user) = self.find_first(|u| u.email.eq_ignore_ascii_case(login)) {
            return Ok(Some(user));
        }
        let login = login.to_lowercase();
        Ok(self.find_first(|u| u.username.to_lowercase() == login))
    }

    async fn find_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> RepoResult<Option<User>> {
        Ok(self.find_first(|u| u.is_linked_to(provider, social_id)))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let username = username.to_lowercase();
        Ok(self.find_first(|u| u.username.to_lowercase() == username).is_some())
    }

    async fn create(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()> {
        let mut users = self.users.write();
        if let Some(err) = users.values().find_map(|s| Self::conflict(&s.user, user)) {
            return Err(err);
        }
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.map(String::from),
            },
        );
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write();
        if let (Some(provider), Some(social_id)) = (user.social_provider, user.social_id.as_deref())
        {
            let taken = users
                .values()
                .any(|s| s.user.id != user.id && s.user.is_linked_to(provider, social_id));
            if taken {
                return Err(DomainError::SocialAccountAlreadyLinked);
            }
        }

        let stored = users.get_mut(&user.id).ok_or(DomainError::UserNotFound(user.id))?;
        // username and email are immutable after creation
        let (username, email) = (stored.user.username.clone(), stored.user.email.clone());
        stored.user = User {
            username,
            email,
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self
            .users
            .read()
            .get(&id)
            .and_then(|stored| stored.password_hash.clone()))
    }

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let mut users = self.users.write();
        let stored = users.get_mut(&id).ok_or(DomainError::UserNotFound(id))?;
        stored.password_hash = Some(password_hash.to_string());
        stored.user.updated_at = Utc::now();
        Ok(())
    }
}
