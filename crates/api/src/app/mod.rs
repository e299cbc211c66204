//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: configuration and store/authenticator wiring
//! - `routes/`: HTTP routes + handlers (one file per surface area)
//! - `dto.rs`: request/response DTOs and JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppConfig;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(config: AppConfig) -> Router {
    let services = Arc::new(services::build_services(&config).await);
    let auth_state = middleware::AuthState {
        authenticator: services.authenticator.clone(),
    };

    // Protected routes: the auth layer runs before method dispatch, so even
    // a wrong verb on these paths requires a valid token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/login",
            post(routes::session::login).fallback(routes::method_not_allowed),
        )
        .merge(protected)
        .fallback(routes::not_found)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
