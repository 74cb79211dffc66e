//! The principal executing an operation

use crate::access::{effective_role, is_admin, is_admin_or_manager};
use crate::entities::User;
use crate::value_objects::Role;

/// Either a resolved user or the anonymous sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    User(User),
}

impl Actor {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub fn handle(&self) -> Option<&str> {
        self.user().map(User::handle)
    }

    /// `None` for anonymous actors.
    pub fn role(&self) -> Option<Role> {
        self.user().map(effective_role)
    }

    /// MANAGER or ADMIN under the effective role.
    pub fn is_privileged(&self) -> bool {
        self.role().is_some_and(is_admin_or_manager)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(is_admin)
    }

    /// Exact match between the actor's handle and a record owner.
    pub fn owns(&self, employee_name: &str) -> bool {
        self.handle() == Some(employee_name)
    }
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}

impl From<Option<User>> for Actor {
    fn from(user: Option<User>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}
