//! Role policy for the whole API surface.
//!
//! One pure function decides every operation. Anything not explicitly allowed
//! below is denied.

use thiserror::Error;

use crate::role::Role;

/// An operation a caller may attempt.
///
/// `EditUserRole` carries the requested new role so the self-demotion rule can
/// be decided here rather than in a handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    ReadItems,
    CreateItem,
    UpdateItem,
    DeleteItem,
    CreateUser,
    ListUsers,
    EditUserRole(Role),
    DeleteUser,
}

impl Action {
    /// Permission-style label used in deny messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReadItems => "items.read",
            Action::CreateItem => "items.create",
            Action::UpdateItem => "items.update",
            Action::DeleteItem => "items.delete",
            Action::CreateUser => "users.create",
            Action::ListUsers => "users.list",
            Action::EditUserRole(_) => "users.edit_role",
            Action::DeleteUser => "users.delete",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(&'static str),

    #[error("{0}")]
    SelfProtection(&'static str),
}

/// Authorize `role` to perform `action`.
///
/// `is_self` states whether the action targets the caller's own account; it is
/// only meaningful for user-management actions.
///
/// - No IO
/// - No panics
/// - Deny by default: every allowed combination is listed explicitly.
pub fn authorize(role: Role, action: Action, is_self: bool) -> Result<(), PolicyError> {
    match (role, action) {
        // The item catalog is shared: both roles read and write it.
        (_, Action::ReadItems | Action::CreateItem | Action::UpdateItem) => Ok(()),
        (Role::Admin, Action::DeleteItem) => Ok(()),

        // User management is admin-only, with two rules guarding the caller's
        // own account.
        (Role::Admin, Action::CreateUser | Action::ListUsers) => Ok(()),
        (Role::Admin, Action::EditUserRole(new_role)) => {
            if is_self && new_role != Role::Admin {
                Err(PolicyError::SelfProtection("you cannot change your own role"))
            } else {
                Ok(())
            }
        }
        (Role::Admin, Action::DeleteUser) => {
            if is_self {
                Err(PolicyError::SelfProtection("you cannot delete your own account"))
            } else {
                Ok(())
            }
        }

        (Role::Technician, action) => Err(PolicyError::Forbidden(action.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_roles_share_the_item_catalog() {
        for action in [Action::ReadItems, Action::CreateItem, Action::UpdateItem] {
            assert_eq!(authorize(Role::Admin, action, false), Ok(()));
            assert_eq!(authorize(Role::Technician, action, false), Ok(()));
        }
    }

    #[test]
    fn only_admins_delete_items() {
        assert_eq!(authorize(Role::Admin, Action::DeleteItem, false), Ok(()));
        assert_eq!(
            authorize(Role::Technician, Action::DeleteItem, false),
            Err(PolicyError::Forbidden("items.delete"))
        );
    }

    #[test]
    fn user_management_is_admin_only() {
        let actions = [
            Action::CreateUser,
            Action::ListUsers,
            Action::EditUserRole(Role::Technician),
            Action::EditUserRole(Role::Admin),
            Action::DeleteUser,
        ];
        for action in actions {
            assert_eq!(authorize(Role::Admin, action, false), Ok(()));
            assert!(matches!(
                authorize(Role::Technician, action, false),
                Err(PolicyError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn admins_cannot_demote_themselves() {
        assert!(matches!(
            authorize(Role::Admin, Action::EditUserRole(Role::Technician), true),
            Err(PolicyError::SelfProtection(_))
        ));
        // Re-asserting admin on yourself is a no-op, not a demotion.
        assert_eq!(
            authorize(Role::Admin, Action::EditUserRole(Role::Admin), true),
            Ok(())
        );
    }

    #[test]
    fn admins_cannot_delete_themselves() {
        assert!(matches!(
            authorize(Role::Admin, Action::DeleteUser, true),
            Err(PolicyError::SelfProtection(_))
        ));
        assert_eq!(authorize(Role::Admin, Action::DeleteUser, false), Ok(()));
    }

    #[test]
    fn is_self_never_changes_item_decisions() {
        for is_self in [false, true] {
            assert_eq!(authorize(Role::Technician, Action::CreateItem, is_self), Ok(()));
            assert_eq!(
                authorize(Role::Technician, Action::DeleteItem, is_self),
                Err(PolicyError::Forbidden("items.delete"))
            );
        }
    }
}
