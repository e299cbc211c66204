use axum::{Router, http::StatusCode, routing::get, routing::post};

use crate::app::errors::json_error;

pub mod items;
pub mod reorder;
pub mod session;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
///
/// Every known path carries a method fallback so an unsupported verb gets a
/// JSON 405 instead of an empty response.
pub fn router() -> Router {
    Router::new()
        .route(
            "/items",
            get(items::read_items)
                .post(items::create_item)
                .put(items::update_item)
                .delete(items::delete_item)
                .fallback(method_not_allowed),
        )
        .route("/reorder", get(reorder::report).fallback(method_not_allowed))
        .route("/register", post(users::register).fallback(method_not_allowed))
        .route(
            "/users",
            get(users::list_users)
                .put(users::update_user)
                .delete(users::delete_user)
                .fallback(method_not_allowed),
        )
}

pub async fn method_not_allowed() -> axum::response::Response {
    json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "Method not allowed",
    )
}

pub async fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "Route not found")
}
