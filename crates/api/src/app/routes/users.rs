use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use stockroom_auth::Action;
use stockroom_core::UserId;
use stockroom_store::NewUser;

use crate::app::dto::{RegisterRequest, UpdateUserRequest, UserResponse};
use crate::app::errors::{json_error, store_error_to_response};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    #[serde(default)]
    pub id: Option<String>,
}

fn parse_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse::<UserId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid user id"))
}

fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("username cannot be empty");
    }
    if username.len() > 64 {
        return Err("username is too long (max 64 characters)");
    }
    if !username
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err("username may only contain letters, digits, '.', '_' and '-'");
    }
    Ok(())
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::CreateUser, false) {
        return resp;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            );
        }
    };

    let username = body.username.trim();
    if let Err(message) = validate_username(username) {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", message);
    }
    if body.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "password cannot be empty",
        );
    }

    let password_hash = match services.hasher.hash(&body.password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "password hashing failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "Unable to register user",
            );
        }
    };

    let new_user = NewUser {
        username: username.to_string(),
        password_hash,
        role: body.role,
    };
    match services.credentials.insert_user(&new_user).await {
        Ok(id) => {
            tracing::info!(username = %new_user.username, role = %new_user.role, "user registered");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": "User registered successfully",
                    "id": id,
                })),
            )
                .into_response()
        }
        Err(err) => store_error_to_response(err, "User not found", "Unable to register user"),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::ListUsers, false) {
        return resp;
    }
    match services.credentials.list_users().await {
        Ok(users) => {
            let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => store_error_to_response(err, "User not found", "Error fetching users"),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<UserParams>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            );
        }
    };
    // Role gate first; the self-demotion rule needs the target id below.
    if let Err(resp) = authz::require(&user, Action::EditUserRole(body.role), false) {
        return resp;
    }

    let Some(raw) = params.id.as_deref() else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "User ID is required for update",
        );
    };
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let is_self = id == user.user_id();
    if let Err(resp) = authz::require(&user, Action::EditUserRole(body.role), is_self) {
        return resp;
    }

    match services.credentials.update_role(id, body.role).await {
        Ok(()) => {
            tracing::info!(user_id = %id, role = %body.role, changed_by = %user.username(), "user role updated");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "User updated successfully" })),
            )
                .into_response()
        }
        Err(err) => store_error_to_response(err, "User not found", "Error updating user"),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<UserParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&user, Action::DeleteUser, false) {
        return resp;
    }
    let Some(raw) = params.id.as_deref() else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "User ID is required for delete",
        );
    };
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(resp) = authz::require(&user, Action::DeleteUser, id == user.user_id()) {
        return resp;
    }

    match services.credentials.delete_user(id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, deleted_by = %user.username(), "user deleted");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "User deleted successfully" })),
            )
                .into_response()
        }
        Err(err) => store_error_to_response(err, "User not found", "Error deleting user"),
    }
}
