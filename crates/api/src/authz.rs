//! API-side authorization guard.
//!
//! Enforces the role policy at the handler boundary (before any store call),
//! keeping handlers free of scattered role checks.

use axum::http::StatusCode;

use stockroom_auth::{Action, PolicyError, authorize};

use crate::app::errors::json_error;
use crate::context::CurrentUser;

/// Check `action` for the current caller; `is_self` marks user-management
/// actions aimed at the caller's own account.
///
/// Returns the ready-to-send 403 on denial so handlers can `?`-return it.
pub fn require(
    user: &CurrentUser,
    action: Action,
    is_self: bool,
) -> Result<(), axum::response::Response> {
    authorize(user.role(), action, is_self).map_err(|err| match err {
        PolicyError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        PolicyError::SelfProtection(_) => {
            json_error(StatusCode::FORBIDDEN, "self_protection", err.to_string())
        }
    })
}
