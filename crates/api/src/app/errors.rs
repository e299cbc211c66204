use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_store::StoreError;

/// Every non-2xx response carries `{"error": code, "message": text}`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a store error to the JSON envelope; backend faults become 500.
///
/// `not_found` and `failure` carry the route-flavored wording so the client
/// sees "Item not found" rather than a generic noun.
pub fn store_error_to_response(
    err: StoreError,
    not_found: &'static str,
    failure: &'static str,
) -> axum::response::Response {
    store_error_response(err, not_found, failure, false)
}

/// Like [`store_error_to_response`] but backend faults become 503, the
/// surface login and item creation expose.
pub fn store_error_to_unavailable(
    err: StoreError,
    not_found: &'static str,
    failure: &'static str,
) -> axum::response::Response {
    store_error_response(err, not_found, failure, true)
}

fn store_error_response(
    err: StoreError,
    not_found: &'static str,
    failure: &'static str,
    unavailable: bool,
) -> axum::response::Response {
    match err {
        StoreError::UnknownCategory => json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "category does not exist",
        ),
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", not_found),
        StoreError::DuplicateUsername => {
            json_error(StatusCode::CONFLICT, "conflict", "Username already exists")
        }
        StoreError::Backend(_) | StoreError::Timeout(_) | StoreError::Corrupt(_) => {
            // The cause goes to the log, never to the caller.
            tracing::error!(error = %err, "store failure");
            if unavailable {
                json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", failure)
            } else {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", failure)
            }
        }
    }
}
