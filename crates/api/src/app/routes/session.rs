use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::LoginRequest;
use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::authenticator::AuthenticateError;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
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

    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Please enter both username and password.",
        );
    }

    match services.authenticator.login(username, &body.password).await {
        Ok((identity, token)) => {
            tracing::info!(username = %identity.username, "login succeeded");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "message": "Login successful",
                    "token": token,
                    "role": identity.role,
                })),
            )
                .into_response()
        }
        Err(AuthenticateError::Auth(_)) => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid credentials",
        ),
        Err(err) => {
            tracing::error!(error = %err, "login backend failure");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "authentication unavailable",
            )
        }
    }
}
