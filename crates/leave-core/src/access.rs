//! Role resolver
//!
//! The only place the superuser override is applied. Callers never inspect
//! `User::is_superuser` directly.

use crate::entities::User;
use crate::value_objects::Role;

/// Effective permission level: superusers are always ADMIN, everyone else gets
/// their stored role.
pub fn effective_role(user: &User) -> Role {
    if user.is_superuser {
        Role::Admin
    } else {
        user.role
    }
}

#[inline]
pub fn is_admin_or_manager(role: Role) -> bool {
    matches!(role, Role::Manager | Role::Admin)
}

#[inline]
pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}
