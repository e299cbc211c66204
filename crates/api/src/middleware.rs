use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use stockroom_auth::AuthError;

use crate::app::errors::json_error;
use crate::authenticator::{AuthenticateError, Authenticator};
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

/// Resolve the bearer token and stash the caller in request extensions.
///
/// 401s distinguish a missing credential from a bad one by error code;
/// credential-store failures surface as 500, not 401, so an outage is not
/// mistaken for a revoked token.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "missing bearer token",
        )
    })?;

    let identity = state
        .authenticator
        .authenticate(token)
        .await
        .map_err(|err| match err {
            AuthenticateError::Auth(AuthError::Unauthenticated) => json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "missing bearer token",
            ),
            AuthenticateError::Auth(AuthError::InvalidCredentials) => json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid or expired token",
            ),
            AuthenticateError::Store(_) | AuthenticateError::Password(_) => {
                tracing::error!(error = %err, "authentication backend failure");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "authentication unavailable",
                )
            }
        })?;

    req.extensions_mut().insert(CurrentUser::new(identity));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
