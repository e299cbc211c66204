//! Roles and resolved caller identity.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, UserId};

/// Access level of a user account.
///
/// The set is closed: policy decisions are exhaustive matches over this enum,
/// so adding a role forces every decision to be revisited instead of falling
/// through a default.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Technician => "technician",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "technician" => Ok(Role::Technician),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// A fully resolved caller for authorization decisions.
///
/// Construction is intentionally decoupled from transport and storage: the API
/// layer builds this after verifying a token and re-reading the account, so a
/// deleted or demoted user never acts under a stale role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_wire_names() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("technician".parse::<Role>(), Ok(Role::Technician));
    }

    #[test]
    fn unknown_roles_are_rejected() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(
            serde_json::to_value(Role::Technician).unwrap(),
            serde_json::json!("technician")
        );
    }
}
